use anyhow::{bail, Context, Result};
use clap::Parser;
use rdp_common::{Point, Size};
use rdp_display::{
    CursorManager, CursorPlatform, CursorState, PointerConfig, ScaleDirection, ScaleResolver,
    SoftwarePlatform, Surface, WindowId,
};
use rdp_pixelbuffer::{PixelFormat, PointerMasks};
use rdp_pointer::{pointer_channel, ChannelPointerBackend, Graphics, PointerAttributes};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

mod args;
mod pattern;

use args::Args;
use pattern::Masks;

const WINDOW: WindowId = WindowId(1);

fn init_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "rdpcursor={},rdp_display={},rdp_pointer={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

fn load_config(args: &Args) -> Result<PointerConfig> {
    let mut config = match &args.config {
        Some(path) => PointerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PointerConfig::default(),
    };

    if let Some(scale) = args.content_scale {
        config.content_scale = scale;
    }
    if let Some(filter) = args.filter {
        config.scale_filter = filter.into();
    }
    if args.smart_sizing {
        config.smart_sizing = true;
    }
    if args.no_hidpi_alternate {
        config.hidpi_alternate = false;
    }
    config.validate()?;
    Ok(config)
}

fn load_masks(args: &Args) -> Result<Masks> {
    match (&args.xor_mask, &args.and_mask) {
        (Some(xor), Some(and)) => Ok(Masks {
            xor: std::fs::read(xor).with_context(|| format!("reading {}", xor.display()))?,
            and: std::fs::read(and).with_context(|| format!("reading {}", and.display()))?,
            bpp: args.bpp,
        }),
        (None, _) => Ok(pattern::generate(args.pattern, args.width, args.height, args.bpp)),
        (Some(_), None) => bail!("--xor-mask needs --and-mask"),
    }
}

fn save_png(surface: &Surface, path: &Path) -> Result<()> {
    surface
        .to_rgba_image()
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(
        "Wrote {}x{} image to {}",
        surface.width(),
        surface.height(),
        path.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("Starting rdpcursor {}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    let masks = load_masks(&args)?;
    let session_size = Size::new(args.session_width, args.session_height);

    let mut platform = SoftwarePlatform::from_config(&config);
    let metrics = args.window_metrics(WINDOW, config.content_scale);
    info!(
        "Window {}x{} at content scale {}, display scale {}",
        metrics.logical_size.width,
        metrics.logical_size.height,
        metrics.content_scale,
        metrics.display_scale
    );
    platform.open_window(metrics);
    platform.set_focus(Some(WINDOW));
    let mut manager = CursorManager::from_config(platform, session_size, &config);

    let (tx, rx) = pointer_channel();
    let backend = Arc::new(ChannelPointerBackend::new(tx, PixelFormat::bgra32()));
    if masks.bpp == 8 {
        backend.set_palette(Some(pattern::grey_palette()));
    }
    let mut graphics = Graphics::new();
    graphics.register_pointer(backend);

    let (width, height, hotspot) = (args.width, args.height, Point::new(args.hot_x, args.hot_y));
    let producer = thread::spawn(move || -> Result<()> {
        let backend = graphics
            .pointer()
            .context("no pointer backend registered")?;
        let pointer = backend.new_pointer(&PointerAttributes {
            width,
            height,
            hotspot,
            masks: PointerMasks {
                xor_mask: &masks.xor,
                and_mask: &masks.and,
                xor_bpp: masks.bpp,
            },
        })?;
        debug!("Decoded {:?}", pointer);
        backend.set(&pointer)?;
        backend.set_position(session_size.width / 2, session_size.height / 2)?;
        Ok(())
    });

    // UI loop: apply events until the producer hangs up
    loop {
        match rx.recv_timeout(Duration::from_millis(50)) {
            Some(event) => manager.handle_event(event)?,
            None if rx.is_disconnected() => break,
            None => continue,
        }
    }
    producer
        .join()
        .map_err(|_| anyhow::anyhow!("pointer producer panicked"))??;

    let CursorState::Custom(id) = manager.state() else {
        warn!("No custom cursor installed (state {})", manager.state());
        bail!("pointer could not be turned into a cursor");
    };

    let native = manager
        .current()
        .context("custom cursor without native handles")?;
    let full = native.surface().context("custom cursor without surface")?;
    let cursor = manager
        .platform()
        .active_cursor()
        .context("platform has no active cursor")?;
    info!(
        "{} installed: nominal {}x{}, full resolution {}x{}, hotspot ({}, {})",
        id,
        cursor.nominal.width,
        cursor.nominal.height,
        full.width(),
        full.height(),
        cursor.hotspot_x,
        cursor.hotspot_y
    );

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let mut nominal = Surface::new(cursor.nominal, full.format())?;
    nominal.blit_scaled(full, config.scale_filter)?;
    save_png(&nominal, &args.output.join("cursor.png"))?;
    save_png(full, &args.output.join("cursor@hidpi.png"))?;

    if let Some((window, position)) = manager.platform().pointer_position() {
        let metrics = manager
            .platform()
            .window_metrics(window)
            .context("focused window closed")?;
        let resolver = ScaleResolver::new(session_size, config.smart_sizing);
        let back =
            resolver.scale_coordinates(&metrics, position, ScaleDirection::WindowToSession, true)?;
        debug!(
            "Pointer at window ({}, {}), session ({}, {})",
            position.x, position.y, back.x, back.y
        );

        // preview of the cursor composited around its hot point
        let preview_size = Size::new(cursor.width * 3, cursor.height * 3);
        let mut frame = vec![0x40u8; preview_size.area() as usize * 4];
        let mut preview = SoftwarePlatform::from_config(&config);
        preview.set_cursor(&cursor);
        preview.warp_mouse(
            window,
            Point::new(preview_size.width as i32 / 2, preview_size.height as i32 / 2),
        );
        preview.render_to_frame(&mut frame, preview_size.width, preview_size.height);

        let path = args.output.join("preview.png");
        image::RgbaImage::from_raw(preview_size.width, preview_size.height, frame)
            .context("preview buffer size mismatch")?
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote preview to {}", path.display());
    }

    Ok(())
}
