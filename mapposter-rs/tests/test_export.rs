use futures::future::BoxFuture;
use futures::FutureExt;
use mapposter_rs::basemap::{BasemapImage, BasemapProvider, BasemapQuery, StaticMapProvider};
use mapposter_rs::mapposter_canvas2d::FontConfig;
use mapposter_rs::{
    compose, BasemapError, ComposeOptions, Design, ExportConfig, ExportFormat, ExportRequest,
    ExportState, Exporter, FontLibrary, PlaceholderProvider, SizePreset,
};
use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn fonts() -> Arc<FontLibrary> {
    Arc::new(FontLibrary::new(&FontConfig {
        load_system_fonts: false,
        ..Default::default()
    }))
}

fn quick_config() -> ExportConfig {
    ExportConfig {
        font_ready_timeout: Duration::from_millis(200),
        settle_delay: Duration::ZERO,
        pass_delay: Duration::ZERO,
        ..Default::default()
    }
}

fn exporter_with(basemaps: Arc<dyn BasemapProvider>) -> Exporter {
    Exporter::new(fonts(), basemaps).with_config(quick_config())
}

fn dimensions(bytes: &[u8]) -> (u32, u32) {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .unwrap()
        .into_dimensions()
        .unwrap()
}

struct OfflineProvider;

impl BasemapProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    fn fetch<'a>(&'a self, _query: &'a BasemapQuery) -> BoxFuture<'a, Result<BasemapImage, BasemapError>> {
        async { Err(BasemapError::InvalidRequest("offline".to_string())) }.boxed()
    }
}

#[tokio::test]
async fn test_11x14_at_300_dpi_png() {
    let scene = compose(&Design::default(), &ComposeOptions::default());
    let exporter = exporter_with(Arc::new(PlaceholderProvider));
    let request = ExportRequest::new(ExportFormat::Png, SizePreset::In11x14, 300);

    let artifact = exporter.export(&scene, &request).await.unwrap();
    assert_eq!((artifact.width, artifact.height), (3300, 4200));
    assert_eq!(dimensions(&artifact.bytes), (3300, 4200));
    assert_eq!(artifact.filename, "new-york-11x14.png");
    assert_eq!(artifact.mime_type, "image/png");
    assert!(artifact.warnings.is_empty());
}

#[tokio::test]
async fn test_lifecycle_transitions() {
    let states = Arc::new(Mutex::new(Vec::new()));
    let recorder = states.clone();
    let exporter = exporter_with(Arc::new(PlaceholderProvider))
        .with_observer(Arc::new(move |state: ExportState| recorder.lock().unwrap().push(state)));

    let scene = compose(&Design::default(), &ComposeOptions::default());
    let request = ExportRequest::new(ExportFormat::Jpeg, SizePreset::Web, 72);
    exporter.export(&scene, &request).await.unwrap();

    assert_eq!(
        *states.lock().unwrap(),
        vec![
            ExportState::Preparing,
            ExportState::AwaitingFonts,
            ExportState::Rasterizing,
            ExportState::Packaged,
            ExportState::Idle,
        ]
    );
}

#[tokio::test]
async fn test_invalid_request_fails_without_artifact() {
    let states = Arc::new(Mutex::new(Vec::new()));
    let recorder = states.clone();
    let exporter = exporter_with(Arc::new(PlaceholderProvider))
        .with_observer(Arc::new(move |state: ExportState| recorder.lock().unwrap().push(state)));

    let scene = compose(&Design::default(), &ComposeOptions::default());
    let request = ExportRequest::new(ExportFormat::Png, SizePreset::In8x10, 20);
    let err = exporter.export(&scene, &request).await.unwrap_err();

    assert_eq!(err.state, ExportState::Preparing);
    assert_eq!(
        *states.lock().unwrap(),
        vec![ExportState::Preparing, ExportState::Failed]
    );
}

#[tokio::test]
async fn test_pdf_and_jpeg_passes() {
    let design = Design::default();
    let scene = compose(&design, &ComposeOptions::default());
    let exporter = exporter_with(Arc::new(PlaceholderProvider));
    let requests = [
        ExportRequest::new(ExportFormat::Jpeg, SizePreset::Web, 72),
        ExportRequest::new(ExportFormat::Pdf, SizePreset::Web, 72),
    ];

    let results = exporter.export_all(&scene, &requests).await;
    assert_eq!(results.len(), 2);

    let jpeg = results[0].as_ref().unwrap();
    assert_eq!(jpeg.mime_type, "image/jpeg");
    assert_eq!(dimensions(&jpeg.bytes), (800, 1000));

    let pdf = results[1].as_ref().unwrap();
    assert!(pdf.bytes.starts_with(b"%PDF"));
    assert_eq!(pdf.filename, "new-york-web.pdf");
    let text = String::from_utf8_lossy(&pdf.bytes);
    assert!(text.contains("/MediaBox [0 0 800 1000]"));
}

#[tokio::test]
async fn test_repeated_export_has_same_dimensions() {
    let scene = compose(&Design::default(), &ComposeOptions::default());
    let exporter = exporter_with(Arc::new(PlaceholderProvider));
    let request = ExportRequest::new(ExportFormat::Png, SizePreset::In8x10, 100);

    let first = exporter.export(&scene, &request).await.unwrap();
    let second = exporter.export(&scene, &request).await.unwrap();
    assert_eq!(dimensions(&first.bytes), (800, 1000));
    assert_eq!(dimensions(&first.bytes), dimensions(&second.bytes));
}

#[tokio::test]
async fn test_basemap_failures_warn_when_repeated() {
    let scene = compose(&Design::default(), &ComposeOptions::default());
    let exporter = exporter_with(Arc::new(OfflineProvider));
    let request = ExportRequest::new(ExportFormat::Png, SizePreset::Web, 72);

    let first = exporter.export(&scene, &request).await.unwrap();
    assert!(first.warnings.is_empty());

    let second = exporter.export(&scene, &request).await.unwrap();
    assert_eq!(second.warnings.len(), 1);
    assert!(second.warnings[0].contains("placeholder"));
}

/// Bytes of the first TrueType/OpenType file found in the usual font directories.
fn installed_font_data() -> Option<Vec<u8>> {
    fn find(dir: &Path, depth: usize) -> Option<PathBuf> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .ok()?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .collect();
        paths.sort();
        for path in paths {
            if path.is_dir() && depth > 0 {
                if let Some(found) = find(&path, depth - 1) {
                    return Some(found);
                }
            } else if matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("ttf" | "otf" | "TTF" | "OTF")
            ) {
                return Some(path);
            }
        }
        None
    }
    ["/usr/share/fonts", "/usr/local/share/fonts", "/Library/Fonts"]
        .iter()
        .find_map(|dir| find(Path::new(dir), 4))
        .and_then(|path| std::fs::read(path).ok())
}

#[tokio::test]
async fn test_registered_font_draws_poster_text() {
    let Some(data) = installed_font_data() else {
        eprintln!("no font files installed, skipping");
        return;
    };
    let mut design = Design::default();
    design.text.city.font = "Poster Display".to_string();
    design.text.coordinates.font = "Poster Display".to_string();
    design.text.country.font = "Poster Display".to_string();
    let scene = compose(&design, &ComposeOptions::default());
    let request = ExportRequest::new(ExportFormat::Png, SizePreset::Web, 72);

    let without_fonts = exporter_with(Arc::new(PlaceholderProvider))
        .export(&scene, &request)
        .await
        .unwrap();

    let library = FontLibrary::new(&FontConfig {
        load_system_fonts: false,
        ..Default::default()
    })
    .with_font_data(data, Some("Poster Display".to_string()));
    let with_fonts = Exporter::new(Arc::new(library), Arc::new(PlaceholderProvider))
        .with_config(quick_config())
        .export(&scene, &request)
        .await
        .unwrap();

    assert_eq!(dimensions(&with_fonts.bytes), (800, 1000));
    let bare = image::load_from_memory(&without_fonts.bytes).unwrap().to_rgba8();
    let lettered = image::load_from_memory(&with_fonts.bytes).unwrap().to_rgba8();
    let changed = bare
        .pixels()
        .zip(lettered.pixels())
        .filter(|(a, b)| a != b)
        .count();
    assert!(changed > 100, "only {changed} pixels changed");
}

#[tokio::test]
async fn test_unknown_family_falls_back_to_registered_face() {
    let Some(data) = installed_font_data() else {
        eprintln!("no font files installed, skipping");
        return;
    };
    let mut design = Design::default();
    design.text.city.font = "Not A Real Family".to_string();
    let scene = compose(&design, &ComposeOptions::default());
    let library = FontLibrary::new(&FontConfig {
        load_system_fonts: false,
        ..Default::default()
    })
    .with_font_data(data, None);
    let exporter = Exporter::new(Arc::new(library), Arc::new(PlaceholderProvider))
        .with_config(quick_config());

    let artifact = exporter
        .export(&scene, &ExportRequest::new(ExportFormat::Png, SizePreset::Web, 72))
        .await
        .unwrap();
    assert_eq!(dimensions(&artifact.bytes), (800, 1000));
}

struct MapServer {
    url: String,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MapServer {
    /// Serves `status` and `body` for every request.
    fn new(status: u16, body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => respond(stream, status, &body),
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });
        Self {
            url: format!("http://{addr}"),
            running,
            handle: Some(handle),
        }
    }
}

impl Drop for MapServer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn respond(mut stream: TcpStream, status: u16, body: &[u8]) {
    let _ = stream.set_nonblocking(false);
    let Ok(reader_stream) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(reader_stream);
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() {
            return;
        }
        if line == "\r\n" || line == "\n" || line.is_empty() {
            break;
        }
    }
    let head = format!(
        "HTTP/1.1 {status} Status\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

fn png_bytes(color: [u8; 4]) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbaImage::from_pixel(16, 16, image::Rgba(color))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn query() -> BasemapQuery {
    BasemapQuery {
        lat: 40.7128,
        lng: -74.006,
        zoom: 12.0,
        width: 32,
        height: 24,
        style_id: "midnight".to_string(),
        theme: mapposter_rs::resolve_style("midnight").basemap,
    }
}

#[tokio::test]
async fn test_static_map_provider_fetches_and_scales() {
    let server = MapServer::new(200, png_bytes([200, 10, 10, 255]));
    let provider = StaticMapProvider::new(format!(
        "{}/{{style}}/{{lat}},{{lng}},{{zoom}}/{{width}}x{{height}}.png",
        server.url
    ))
    .unwrap();

    let image = provider.fetch(&query()).await.unwrap();
    assert_eq!((image.width, image.height), (32, 24));
    assert_eq!(&image.rgba[0..4], &[200, 10, 10, 255]);
}

#[tokio::test]
async fn test_static_map_provider_client_error_is_not_retried() {
    let server = MapServer::new(404, b"missing".to_vec());
    let provider = StaticMapProvider::new(format!("{}/map.png", server.url))
        .unwrap()
        .with_max_retries(0);

    match provider.fetch(&query()).await {
        Err(BasemapError::Status { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected status error, got {other:?}"),
    }
}
