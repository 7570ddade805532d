//! Texture resolution
//!
//! Decal and bump textures resolve asynchronously from the compositor's
//! point of view: it submits [`TextureRequest`]s to a [`TextureResolver`]
//! and drains finished [`TextureOutcome`]s on the host's frame tick. Each
//! outcome carries back the layer name and the epoch captured at submission
//! so the compositor can discard completions whose layer has since been
//! re-applied or cleared.
//!
//! [`LocalResolver`] is the built-in implementation: text and fade payloads
//! rasterize on the CPU, image URLs resolve from data URIs, `file://` paths,
//! or pre-registered pixel data. It resolves during `submit` and hands the
//! queued outcomes back on `drain`, which keeps tests and offline hosts
//! deterministic. Hosts that fetch over HTTP use [`HttpResolver`] (the
//! `network` feature) or implement the trait over their own loader.

use crate::{ComposeError, Result};
use emblem_core::{DecalId, SharedTexture, TextureSource};
use emblem_raster::{decode_base64, load_image_file, rasterize_fade, FontLibrary, TextRasterizer};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// One texture load, addressed to a layer at a point in its epoch history
#[derive(Clone, Debug)]
pub struct TextureRequest {
    pub layer: String,
    /// The layer's epoch when the request was submitted; outcomes from a
    /// superseded epoch are discarded
    pub epoch: u64,
    pub payload: RequestPayload,
}

/// What a request resolves
#[derive(Clone, Debug)]
pub enum RequestPayload {
    /// A decal's texture, from its own source description
    Decal { id: DecalId, source: TextureSource },
    /// A layer's bump material texture
    Bump { url: String },
}

/// A finished resolution
#[derive(Debug)]
pub struct TextureOutcome {
    pub layer: String,
    pub epoch: u64,
    pub target: OutcomeTarget,
    pub result: Result<SharedTexture>,
}

/// What a finished resolution belongs to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutcomeTarget {
    Decal(DecalId),
    /// Bump outcomes carry the URL so a material change during the load can
    /// be detected
    Bump { url: String },
}

impl TextureRequest {
    pub fn decal(layer: impl Into<String>, epoch: u64, id: DecalId, source: TextureSource) -> Self {
        Self {
            layer: layer.into(),
            epoch,
            payload: RequestPayload::Decal { id, source },
        }
    }

    pub fn bump(layer: impl Into<String>, epoch: u64, url: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            epoch,
            payload: RequestPayload::Bump { url: url.into() },
        }
    }

    /// The URL to fetch over the network, when the payload is a remote image
    pub fn fetch_url(&self) -> Option<&str> {
        let url = match &self.payload {
            RequestPayload::Decal {
                source: TextureSource::Image { url },
                ..
            } => url,
            RequestPayload::Bump { url } => url,
            _ => return None,
        };
        if url.starts_with("http://") || url.starts_with("https://") {
            Some(url)
        } else {
            None
        }
    }

    /// Pair this request with its result
    pub fn into_outcome(self, result: Result<SharedTexture>) -> TextureOutcome {
        let target = match self.payload {
            RequestPayload::Decal { id, .. } => OutcomeTarget::Decal(id),
            RequestPayload::Bump { url } => OutcomeTarget::Bump { url },
        };
        TextureOutcome {
            layer: self.layer,
            epoch: self.epoch,
            target,
            result,
        }
    }
}

/// Asynchronous texture loading, driven by the compositor
pub trait TextureResolver {
    /// Start resolving. Must not block the caller for long; slow work
    /// belongs on another thread or task.
    fn submit(&mut self, request: TextureRequest);

    /// Take every outcome that has finished since the last drain
    fn drain(&mut self) -> Vec<TextureOutcome>;
}

/// CPU-only resolver: rasterizes text and fades, decodes local image
/// sources. Remote URLs resolve only if their pixel data was registered
/// beforehand.
pub struct LocalResolver {
    fonts: FontLibrary,
    rasterizer: TextRasterizer,
    images: FxHashMap<String, SharedTexture>,
    ready: Vec<TextureOutcome>,
}

impl LocalResolver {
    /// Resolver with an empty font library; register font data before
    /// submitting text decals
    pub fn new() -> Self {
        Self::with_fonts(FontLibrary::new())
    }

    /// Resolver backed by the fonts installed on this machine
    pub fn with_system_fonts() -> Self {
        Self::with_fonts(FontLibrary::with_system_fonts())
    }

    pub fn with_fonts(fonts: FontLibrary) -> Self {
        Self {
            fonts,
            rasterizer: TextRasterizer::new(),
            images: FxHashMap::default(),
            ready: Vec::new(),
        }
    }

    pub fn register_font_data(&mut self, data: Vec<u8>) {
        self.fonts.register_font_data(data);
    }

    /// Make a URL resolvable from an already-loaded texture
    pub fn register_texture(&mut self, url: impl Into<String>, texture: SharedTexture) {
        self.images.insert(url.into(), texture);
    }

    /// Decode encoded image bytes now and make the URL resolvable from them
    pub fn register_image_bytes(&mut self, url: impl Into<String>, bytes: &[u8]) -> Result<()> {
        let texture = Arc::new(emblem_raster::decode_image(bytes)?);
        self.images.insert(url.into(), texture);
        Ok(())
    }

    fn resolve_source(&mut self, source: &TextureSource) -> Result<SharedTexture> {
        match source {
            TextureSource::Image { url } => self.resolve_url(url),
            TextureSource::Text(spec) => {
                let font = self.fonts.find(&spec.font)?;
                Ok(Arc::new(self.rasterizer.rasterize(&font, spec)?))
            }
            TextureSource::Fade(spec) => Ok(Arc::new(rasterize_fade(spec))),
        }
    }

    fn resolve_url(&self, url: &str) -> Result<SharedTexture> {
        if url.starts_with("data:") {
            return Ok(Arc::new(decode_base64(url)?));
        }
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(Arc::new(load_image_file(path)?));
        }
        self.images.get(url).cloned().ok_or_else(|| {
            ComposeError::Resolution(format!("no local source registered for '{url}'"))
        })
    }
}

impl Default for LocalResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureResolver for LocalResolver {
    fn submit(&mut self, request: TextureRequest) {
        let result = match &request.payload {
            RequestPayload::Decal { source, .. } => self.resolve_source(source),
            RequestPayload::Bump { url } => self.resolve_url(url),
        };
        self.ready.push(request.into_outcome(result));
    }

    fn drain(&mut self) -> Vec<TextureOutcome> {
        std::mem::take(&mut self.ready)
    }
}

/// Resolver that fetches `http(s)` image sources with reqwest on a tokio
/// runtime; everything else falls through to an inner [`LocalResolver`].
#[cfg(feature = "network")]
pub struct HttpResolver {
    local: LocalResolver,
    runtime: tokio::runtime::Runtime,
    tx: std::sync::mpsc::Sender<TextureOutcome>,
    rx: std::sync::mpsc::Receiver<TextureOutcome>,
}

#[cfg(feature = "network")]
impl HttpResolver {
    pub fn new() -> Result<Self> {
        Self::with_local(LocalResolver::new())
    }

    pub fn with_local(local: LocalResolver) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ComposeError::Network(e.to_string()))?;
        let (tx, rx) = std::sync::mpsc::channel();
        Ok(Self {
            local,
            runtime,
            tx,
            rx,
        })
    }

    /// The fallback resolver, for registering fonts and local pixel data
    pub fn local_mut(&mut self) -> &mut LocalResolver {
        &mut self.local
    }

    async fn fetch(url: String) -> Result<SharedTexture> {
        let response = reqwest::get(&url)
            .await
            .map_err(|e| ComposeError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ComposeError::Network(format!(
                "HTTP {} for {url}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ComposeError::Network(e.to_string()))?;
        Ok(Arc::new(emblem_raster::decode_image(&bytes)?))
    }
}

#[cfg(feature = "network")]
impl TextureResolver for HttpResolver {
    fn submit(&mut self, request: TextureRequest) {
        let fetch = request.fetch_url().map(str::to_string);
        match fetch {
            Some(url) => {
                let tx = self.tx.clone();
                self.runtime.spawn(async move {
                    let result = Self::fetch(url).await;
                    let _ = tx.send(request.into_outcome(result));
                });
            }
            None => self.local.submit(request),
        }
    }

    fn drain(&mut self) -> Vec<TextureOutcome> {
        let mut outcomes = self.local.drain();
        outcomes.extend(self.rx.try_iter());
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emblem_core::{FadeSpec, Rgb, TextSpec, TextureData};

    // 1x1 red PNG
    const RED_PIXEL_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    fn drain_one(resolver: &mut LocalResolver) -> TextureOutcome {
        let mut outcomes = resolver.drain();
        assert_eq!(outcomes.len(), 1);
        outcomes.pop().unwrap()
    }

    #[test]
    fn test_fade_resolves_synchronously() {
        let mut resolver = LocalResolver::new();
        resolver.submit(TextureRequest::decal(
            "Front",
            3,
            DecalId::new(7),
            TextureSource::Fade(FadeSpec::default()),
        ));

        let outcome = drain_one(&mut resolver);
        assert_eq!(outcome.layer, "Front");
        assert_eq!(outcome.epoch, 3);
        assert_eq!(outcome.target, OutcomeTarget::Decal(DecalId::new(7)));
        let texture = outcome.result.unwrap();
        assert_eq!(texture.width(), emblem_raster::RASTER_SIZE);
        // drained queue stays drained
        assert!(resolver.drain().is_empty());
    }

    #[test]
    fn test_data_uri_image_resolves() {
        let mut resolver = LocalResolver::new();
        resolver.submit(TextureRequest::decal(
            "Front",
            1,
            DecalId::new(1),
            TextureSource::Image {
                url: RED_PIXEL_URI.to_string(),
            },
        ));

        let texture = drain_one(&mut resolver).result.unwrap();
        assert_eq!(texture.pixel(0, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn test_unregistered_url_fails() {
        let mut resolver = LocalResolver::new();
        resolver.submit(TextureRequest::decal(
            "Front",
            1,
            DecalId::new(1),
            TextureSource::Image {
                url: "http://example.com/missing.png".to_string(),
            },
        ));

        let outcome = drain_one(&mut resolver);
        assert!(matches!(outcome.result, Err(ComposeError::Resolution(_))));
    }

    #[test]
    fn test_registered_texture_resolves_by_url() {
        let mut resolver = LocalResolver::new();
        let texture = Arc::new(TextureData::solid(Rgb::new(0, 0, 255), 255, 4, 4));
        resolver.register_texture("http://example.com/logo.png", texture.clone());

        resolver.submit(TextureRequest::bump(
            "Front",
            1,
            "http://example.com/logo.png",
        ));
        let resolved = drain_one(&mut resolver).result.unwrap();
        assert!(Arc::ptr_eq(&resolved, &texture));
    }

    #[test]
    fn test_text_without_fonts_fails() {
        let mut resolver = LocalResolver::new();
        resolver.submit(TextureRequest::decal(
            "Front",
            1,
            DecalId::new(1),
            TextureSource::Text(TextSpec::default()),
        ));

        let outcome = drain_one(&mut resolver);
        assert!(matches!(outcome.result, Err(ComposeError::Raster(_))));
    }

    #[test]
    fn test_missing_file_fails() {
        let mut resolver = LocalResolver::new();
        resolver.submit(TextureRequest::bump(
            "Front",
            1,
            "file:///nonexistent/bump.png",
        ));
        assert!(drain_one(&mut resolver).result.is_err());
    }

    #[test]
    fn test_fetch_url_only_for_remote_images() {
        let remote = TextureRequest::decal(
            "Front",
            1,
            DecalId::new(1),
            TextureSource::Image {
                url: "https://example.com/a.png".to_string(),
            },
        );
        assert_eq!(remote.fetch_url(), Some("https://example.com/a.png"));

        let bump = TextureRequest::bump("Front", 1, "http://example.com/b.png");
        assert_eq!(bump.fetch_url(), Some("http://example.com/b.png"));

        let data = TextureRequest::decal(
            "Front",
            1,
            DecalId::new(1),
            TextureSource::Image {
                url: RED_PIXEL_URI.to_string(),
            },
        );
        assert_eq!(data.fetch_url(), None);

        let fade = TextureRequest::decal(
            "Front",
            1,
            DecalId::new(1),
            TextureSource::Fade(FadeSpec::default()),
        );
        assert_eq!(fade.fetch_url(), None);
    }
}
