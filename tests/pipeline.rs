//! # Flyer Pipeline Tests
//!
//! Drive a session from options to exported bytes with scripted collaborators:
//! generation, placeholder substitution, composition, preview scaling and the
//! settle-gated export.

mod common;

use std::sync::Arc;
use std::time::Duration;

use placard::export::{DEFAULT_SETTLE, ExportFormat, ExportPhase, ExportPipeline};
use placard::flyer::CanvasFormat;
use placard::generator::markup_or_fallback;
use placard::intake::{ImageFile, ImageSlot};
use placard::placeholder::{self, Placeholder};
use placard::qr::PngQrEncoder;
use placard::render::ViewState;
use placard::{ExportError, FlyerOptions, FlyerSession, PlacardError};
use pretty_assertions::assert_eq;

use common::{InstantLoader, ScriptedGenerator, SelectiveLoader, SolidRasterizer, png_bytes};

fn session_with(loader: Arc<dyn placard::export::AssetLoader>) -> FlyerSession {
    let export = ExportPipeline::new(Arc::new(SolidRasterizer), loader, DEFAULT_SETTLE);
    FlyerSession::new(export, Arc::new(PngQrEncoder::default()))
}

async fn generate(session: &mut FlyerSession, generator: &ScriptedGenerator) {
    let request = session.begin_generation();
    let markup = markup_or_fallback(generator, &request.options, request.flags, None).await;
    assert!(session.finish_generation(request.ticket, markup));
}

#[tokio::test(start_paused = true)]
async fn story_flyer_without_qr_keeps_only_qr_token() {
    let generator = ScriptedGenerator::default();
    let mut session = session_with(Arc::new(InstantLoader));

    session
        .set_options(FlyerOptions {
            canvas_format: CanvasFormat::Story,
            ..Default::default()
        })
        .unwrap();
    session.set_image(ImageSlot::Logo, Some(ImageFile::from_bytes("logo.png", &png_bytes()).unwrap()));
    session.set_image(ImageSlot::Speaker, Some(ImageFile::from_bytes("speaker.png", &png_bytes()).unwrap()));
    session.set_image(
        ImageSlot::Background,
        Some(ImageFile::from_stock("https://images.test/retro.jpg")),
    );

    generate(&mut session, &generator).await;

    let doc = session.composed();
    assert_eq!((doc.dimensions.width, doc.dimensions.height), (1080, 1920));
    assert!(doc.html.contains("width: 1080px; height: 1920px;"));
    assert!(doc.html.contains("url('https://images.test/retro.jpg')"));
    assert!(doc.html.contains("data:image/png;base64,"));
    assert!(doc.html.contains("[QR_CODE_IMAGE_URL]"));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.unresolved, vec![Placeholder::Qr]);

    // the generator was told which images exist
    let prompt = generator.last_prompt();
    assert!(prompt.contains("**Logo Requested:** true"));
    assert!(prompt.contains("**QR Code Requested:** false"));
    assert!(prompt.contains("w-[1080px] h-[1920px]"));
}

#[tokio::test(start_paused = true)]
async fn substitution_is_idempotent_on_composed_markup() {
    let generator = ScriptedGenerator::default();
    let mut session = session_with(Arc::new(InstantLoader));
    session.set_qr_url("https://example.com/rsvp");
    generate(&mut session, &generator).await;

    let once = placeholder::substitute(session.markup(), &session.assets());
    let twice = placeholder::substitute(&once, &session.assets());
    assert_eq!(once, twice);
    assert!(placeholder::unresolved(&once).iter().all(|p| *p != Placeholder::Qr));
}

#[tokio::test(start_paused = true)]
async fn export_waits_for_settle_then_matches_canvas() {
    let generator = ScriptedGenerator::default();
    let mut session = session_with(Arc::new(InstantLoader));
    session
        .set_options(FlyerOptions {
            canvas_format: CanvasFormat::Portrait,
            ..Default::default()
        })
        .unwrap();
    generate(&mut session, &generator).await;

    let err = session.export().export(ExportFormat::Png).await.unwrap_err();
    assert!(matches!(err, PlacardError::Export(ExportError::NotReady)));

    session.export().wait_ready().await;
    let png = session.export().export(ExportFormat::Png).await.unwrap();
    let img = image::load_from_memory(&png.bytes).unwrap();
    assert_eq!((img.width(), img.height()), (1080, 1350));

    let jpeg = session.export().export(ExportFormat::Jpeg).await.unwrap();
    assert_eq!(jpeg.filename, "flyer-design.jpeg");
    assert_eq!(image::guess_format(&jpeg.bytes).unwrap(), image::ImageFormat::Jpeg);
}

#[tokio::test(start_paused = true)]
async fn edit_during_settle_restarts_readiness() {
    let generator = ScriptedGenerator::default();
    let mut session = session_with(Arc::new(InstantLoader));
    generate(&mut session, &generator).await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    session.set_qr_url("https://example.com");
    assert!(!session.export().is_ready());

    // the first cycle would have completed here
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!session.export().is_ready());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(session.export().status().phase, ExportPhase::Ready);
}

#[tokio::test(start_paused = true)]
async fn blocked_stock_background_fails_with_notice() {
    let generator = ScriptedGenerator::default();
    let mut session = session_with(Arc::new(SelectiveLoader));
    session.set_image(
        ImageSlot::Background,
        Some(ImageFile::from_stock("https://blocked.test/bg.jpg")),
    );
    generate(&mut session, &generator).await;
    session.export().wait_ready().await;

    let status = session.export().status();
    assert_eq!(status.unreachable_assets, vec!["https://blocked.test/bg.jpg"]);

    let err = session.export().export(ExportFormat::Png).await.unwrap_err();
    assert!(err.to_string().contains("custom uploaded background"));
}

#[tokio::test(start_paused = true)]
async fn preview_scale_follows_container_and_format() {
    let generator = ScriptedGenerator::default();
    let mut session = session_with(Arc::new(InstantLoader));
    generate(&mut session, &generator).await;

    assert_eq!(session.observe_viewport(540.0), ViewState::ScaledDisplay { scale: 0.5 });
    assert_eq!(session.viewport().padding_bottom_css().as_deref(), Some("100%"));

    session
        .set_options(FlyerOptions {
            canvas_format: CanvasFormat::Landscape,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(session.viewport().scale(), Some(0.28125));
    assert_eq!(session.viewport().padding_bottom_css().as_deref(), Some("56.25%"));
}

#[tokio::test(start_paused = true)]
async fn failed_generation_shows_error_fragment() {
    let generator = ScriptedGenerator {
        markup: "   ".to_string(),
        ..Default::default()
    };
    let mut session = session_with(Arc::new(InstantLoader));
    generate(&mut session, &generator).await;
    assert_eq!(session.markup(), placard::generator::ERROR_FRAGMENT);
}
