use anyhow::{Context, bail};
use snip_capture::{PngFileProvider, capture_selection};
use snip_config::{Config, CredentialStore, EnvCredentialStore, FileCredentialStore};
use snip_extract::{ExtractionClient, HttpTransport};
use snip_types::{ExtractionResult, SelectionRect};
use tokio_util::sync::CancellationToken;

use crate::CaptureArgs;
use crate::clipboard;
use crate::profile;

fn selection(args: &CaptureArgs) -> SelectionRect {
    SelectionRect {
        left: args.left,
        top: args.top,
        width: args.width,
        height: args.height,
        device_pixel_ratio: args.dpr,
        scroll_x: args.scroll_x,
        scroll_y: args.scroll_y,
    }
}

/// Fill in the key when config has none: credential file first, then environment
fn resolve_credential(config: &mut Config, args: &CaptureArgs) -> anyhow::Result<()> {
    if config.extraction.usable_credential().is_some() {
        return Ok(());
    }

    let file = FileCredentialStore::new(profile::store_path(args.store.clone())?);
    let stores: [&dyn CredentialStore; 2] = [&file, &EnvCredentialStore];
    for store in stores {
        if let Some(key) = store.get()? {
            config.extraction.credential = Some(key);
            break;
        }
    }
    Ok(())
}

/// Crop, then extract unless `--no-extract`. Returns `None` when nothing was sent.
pub async fn run_capture(
    args: &CaptureArgs,
    mut config: Config,
) -> anyhow::Result<Option<ExtractionResult>> {
    let rect = selection(args);
    if !rect.exceeds(config.selection.min_dim) {
        bail!(
            "Selection {}x{} is too small, both edges must exceed {}px",
            rect.width,
            rect.height,
            config.selection.min_dim
        );
    }

    let provider = PngFileProvider::new(&args.frame);
    let cropped = capture_selection(&provider, rect)
        .await
        .context("Failed to capture selection")?;
    tracing::info!("Cropped selection to {}x{}", cropped.width, cropped.height);

    if let Some(out) = &args.out {
        tokio::fs::write(out, &cropped.png)
            .await
            .with_context(|| format!("Failed to write {}", out.display()))?;
        tracing::info!("Saved crop to {}", out.display());
    }

    if args.no_extract {
        return Ok(None);
    }

    resolve_credential(&mut config, args)?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received, cancelling extraction");
            on_ctrl_c.cancel();
        }
    });

    let client = ExtractionClient::new(HttpTransport::new());
    let result = client
        .extract_text_with_cancel(&cropped, &config.extraction, &cancel)
        .await;
    watcher.abort();
    let result = result?;

    if args.copy
        && let ExtractionResult::Success(text) = &result
    {
        match clipboard::copy_text(text) {
            Ok(()) => tracing::info!("Copied {} chars to clipboard", text.len()),
            Err(e) => tracing::warn!("Clipboard unavailable: {e}"),
        }
    }

    Ok(Some(result))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use image::{Rgba, RgbaImage};
    use snip_capture::encode_png;

    use super::*;

    fn args(frame: PathBuf, width: f64, height: f64) -> CaptureArgs {
        CaptureArgs {
            frame,
            left: 2.0,
            top: 2.0,
            width,
            height,
            dpr: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            out: None,
            no_extract: true,
            copy: false,
            profile: None,
            store: None,
        }
    }

    fn write_frame(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("frame.png");
        let image = RgbaImage::from_pixel(64, 48, Rgba([200, 10, 10, 255]));
        std::fs::write(&path, encode_png(&image).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_crop_only_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("crop.png");
        let mut args = args(write_frame(&dir), 30.0, 20.0);
        args.out = Some(out.clone());

        let result = run_capture(&args, Config::default()).await.unwrap();
        assert!(result.is_none());

        let cropped = image::open(&out).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (30, 20));
    }

    #[tokio::test]
    async fn test_small_selection_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(write_frame(&dir), 5.0, 50.0);
        assert!(run_capture(&args, Config::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_key_reports_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(write_frame(&dir), 30.0, 20.0);
        args.no_extract = false;
        args.store = Some(dir.path().join("keys.json"));

        let result = run_capture(&args, Config::default()).await.unwrap().unwrap();
        assert_eq!(
            result.failure_kind(),
            Some(snip_types::FailureKind::Unauthorized)
        );
    }

    #[tokio::test]
    async fn test_credential_read_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("keys.json");
        FileCredentialStore::new(&store_path)
            .set("AIzaSyExampleKey123")
            .unwrap();

        let mut config = Config::default();
        let mut args = args(write_frame(&dir), 30.0, 20.0);
        args.store = Some(store_path);
        resolve_credential(&mut config, &args).unwrap();
        assert_eq!(
            config.extraction.usable_credential(),
            Some("AIzaSyExampleKey123")
        );
    }
}
