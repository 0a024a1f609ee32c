//! Build-then-serve pipeline.
//!
//! Ingestion runs to completion before the listener is bound; nothing scans
//! the library again once requests are being served.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{LibrarySettings, ServerSettings};
use crate::error::ServeError;
use crate::layout::SiteLayout;
use crate::library::{Catalog, Extractor, scan};
use crate::server::create_router;
use crate::site::{generate_index, generate_pages};

mod settings;
mod shutdown;

pub use settings::load_settings;

/// Scan the library and write every static page.
pub fn ingest<E>(layout: &SiteLayout, library: &LibrarySettings, extractor: &E) -> Catalog
where
    E: Extractor + ?Sized,
{
    info!(library = %layout.resolve(&layout.library_dir).display(), "reading audio files");
    let catalog = scan(layout, library, extractor);

    generate_pages(layout, &catalog);
    if let Err(e) = generate_index(&layout.resolve(&layout.index_page), &catalog) {
        warn!("{e}");
    }

    catalog
}

/// Bind the listener and serve until Ctrl+C / SIGTERM.
pub async fn serve(layout: Arc<SiteLayout>, server: &ServerSettings) -> Result<(), ServeError> {
    let addr = SocketAddr::new(server.bind, server.port);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;

    info!("listening on http://{addr}");

    let app = create_router(layout).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await?;

    info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    use super::*;
    use crate::error::ExtractError;
    use crate::library::TrackMetadata;

    struct OneAlbum;

    impl Extractor for OneAlbum {
        fn extract(&self, path: &Path) -> Result<TrackMetadata, ExtractError> {
            Ok(TrackMetadata {
                title: path.file_stem().map(|s| s.to_string_lossy().into_owned()),
                album: Some("Album".into()),
                duration: Duration::from_secs(90),
                artwork: Some(b"jpeg".to_vec()),
            })
        }
    }

    #[test]
    fn ingest_writes_pages_index_and_artwork() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SiteLayout::rooted_at(dir.path());
        let lib = layout.resolve(&layout.library_dir);
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("one.mp3"), b"x").unwrap();
        fs::write(lib.join("two.mp3"), b"x").unwrap();

        let catalog = ingest(&layout, &LibrarySettings::default(), &OneAlbum);

        assert_eq!(catalog.len(), 2);
        assert!(layout.resolve("music/one.html").is_file());
        assert!(layout.resolve("music/two.html").is_file());
        assert_eq!(fs::read(lib.join("Album.jpg")).unwrap(), b"jpeg");
        let index = fs::read_to_string(layout.resolve("library.html")).unwrap();
        assert_eq!(index.matches("<tr>").count(), 2);
        assert!(index.contains("90s"));
    }

    #[test]
    fn second_ingest_leaves_existing_pages_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SiteLayout::rooted_at(dir.path());
        let lib = layout.resolve(&layout.library_dir);
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("one.mp3"), b"x").unwrap();

        let first = ingest(&layout, &LibrarySettings::default(), &OneAlbum);
        fs::write(layout.resolve("music/one.html"), "edited by hand").unwrap();
        let second = ingest(&layout, &LibrarySettings::default(), &OneAlbum);

        assert_eq!(first, second);
        assert_eq!(
            fs::read_to_string(layout.resolve("music/one.html")).unwrap(),
            "edited by hand"
        );
        assert_eq!(fs::read_dir(layout.resolve("music")).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn links_written_by_ingest_resolve_with_renamed_directories() {
        use axum::body::{Body, to_bytes};
        use axum::http::{Request, StatusCode};
        use tower::ServiceExt;

        let dir = tempfile::tempdir().unwrap();
        let mut settings = crate::config::Settings::default();
        settings.site.base_dir = dir.path().to_path_buf();
        settings.site.resource_dir = "media".into();
        settings.site.pages_dir = "pages".into();
        settings.site.index_page = "catalog.html".into();
        settings.library.dir = "media/songs".into();
        settings.validate().unwrap();

        let layout = Arc::new(SiteLayout::new(&settings.site, &settings.library));
        let lib = layout.resolve(&layout.library_dir);
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("x.mp3"), b"audio").unwrap();

        ingest(&layout, &settings.library, &OneAlbum);
        let page = fs::read_to_string(layout.resolve("pages/x.html")).unwrap();
        assert!(page.contains(r#"src="/media/songs/x.mp3""#));
        assert!(page.contains(r#"src="/media/songs/Album.jpg""#));
        assert!(page.contains(r#"href="/catalog.html""#));
        let index = fs::read_to_string(layout.resolve("catalog.html")).unwrap();
        assert!(index.contains(r#"href="/pages/x.html""#));

        for (uri, expected) in [
            ("/media/songs/x.mp3", &b"audio"[..]),
            ("/media/songs/Album.jpg", &b"jpeg"[..]),
            ("/pages/x.html", page.as_bytes()),
            ("/catalog.html", index.as_bytes()),
        ] {
            let response = create_router(layout.clone())
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(&body[..], expected, "{uri}");
        }
    }

    #[tokio::test]
    async fn serve_reports_bind_failures() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let settings = ServerSettings {
            bind: "127.0.0.1".parse().unwrap(),
            port: taken.local_addr().unwrap().port(),
        };

        let err = serve(Arc::new(SiteLayout::rooted_at(".")), &settings)
            .await
            .unwrap_err();
        assert!(matches!(err, ServeError::Bind { .. }));
    }
}
