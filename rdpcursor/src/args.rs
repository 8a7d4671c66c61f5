use clap::{Parser, ValueEnum};
use rdp_common::{Point, Rect, Size};
use rdp_display::{MonitorScales, WindowId, WindowMetrics};
use rdp_pixelbuffer::ScaleFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rdpcursor")]
#[command(about = "Render a remote desktop pointer update as a local cursor")]
#[command(version)]
pub struct Args {
    /// Pointer width in session pixels
    #[arg(long, default_value_t = 32)]
    pub width: u32,

    /// Pointer height in session pixels
    #[arg(long, default_value_t = 32)]
    pub height: u32,

    /// XOR mask bits per pixel (1, 8, 15, 16, 24 or 32)
    #[arg(long, default_value_t = 32, value_parser = parse_bpp)]
    pub bpp: u32,

    /// Hot point X in session pixels
    #[arg(long, default_value_t = 0)]
    pub hot_x: i32,

    /// Hot point Y in session pixels
    #[arg(long, default_value_t = 0)]
    pub hot_y: i32,

    /// Synthetic pointer image to generate
    #[arg(long, value_enum, default_value_t = Pattern::Arrow)]
    pub pattern: Pattern,

    /// Raw XOR mask file (replaces the synthetic pattern)
    #[arg(long, requires = "and_mask")]
    pub xor_mask: Option<PathBuf>,

    /// Raw AND mask file
    #[arg(long)]
    pub and_mask: Option<PathBuf>,

    /// Session desktop width
    #[arg(long, default_value_t = 1920)]
    pub session_width: u32,

    /// Session desktop height
    #[arg(long, default_value_t = 1080)]
    pub session_height: u32,

    /// Window width in logical units
    #[arg(long, default_value_t = 1280)]
    pub window_width: u32,

    /// Window height in logical units
    #[arg(long, default_value_t = 720)]
    pub window_height: u32,

    /// Session-to-window content scale (overrides the config file)
    #[arg(long)]
    pub content_scale: Option<f64>,

    /// Monitor HiDPI factor, used when no --monitor is given
    #[arg(long, default_value_t = 1.0)]
    pub display_scale: f64,

    /// Monitor layout entry WIDTHxHEIGHT+X+Y@SCALE (repeatable, first is primary)
    #[arg(long = "monitor", value_parser = parse_monitor)]
    pub monitors: Vec<MonitorArg>,

    /// Window origin X in desktop pixels
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub window_x: i32,

    /// Window origin Y in desktop pixels
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub window_y: i32,

    /// Scale the session to the window size
    #[arg(long)]
    pub smart_sizing: bool,

    /// Resampling filter (overrides the config file)
    #[arg(long, value_enum)]
    pub filter: Option<FilterArg>,

    /// Hand the full resolution image to the platform directly
    #[arg(long)]
    pub no_hidpi_alternate: bool,

    /// Configuration file path
    #[arg(short, long, env = "RDPCURSOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory the PNG files are written to
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Synthetic pointer images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pattern {
    /// White arrow with a black outline
    Arrow,
    /// Inverted block in the middle of a transparent square
    Inverted,
    /// Opaque colour gradient
    Gradient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    Nearest,
    Linear,
}

impl From<FilterArg> for ScaleFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Nearest => ScaleFilter::Nearest,
            FilterArg::Linear => ScaleFilter::Linear,
        }
    }
}

/// One monitor of the desktop layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorArg {
    pub area: Rect,
    pub scale: f64,
}

fn parse_monitor(value: &str) -> Result<MonitorArg, String> {
    let invalid = || format!("'{}' is not WIDTHxHEIGHT+X+Y@SCALE", value);
    let (geometry, scale) = value.split_once('@').ok_or_else(invalid)?;
    let (width, rest) = geometry.split_once('x').ok_or_else(invalid)?;
    let mut parts = rest.splitn(3, '+');
    let (Some(height), Some(x), Some(y)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let scale: f64 = scale.parse().map_err(|_| invalid())?;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("monitor scale must be positive, got {}", scale));
    }
    Ok(MonitorArg {
        area: Rect::new(
            x.parse().map_err(|_| invalid())?,
            y.parse().map_err(|_| invalid())?,
            width.parse().map_err(|_| invalid())?,
            height.parse().map_err(|_| invalid())?,
        ),
        scale,
    })
}

impl Args {
    /// Desktop layout from the `--monitor` entries.
    pub fn monitor_scales(&self) -> MonitorScales {
        let mut scales = MonitorScales::default();
        for (index, monitor) in self.monitors.iter().enumerate() {
            scales.push(monitor.area, monitor.scale, index == 0);
        }
        scales
    }

    /// Metrics of the preview window, with the display scale taken from the
    /// monitor holding its origin when a layout is given.
    pub fn window_metrics(&self, id: WindowId, content_scale: f64) -> WindowMetrics {
        let metrics = WindowMetrics {
            id,
            logical_size: Size::new(self.window_width, self.window_height),
            content_scale,
            display_scale: self.display_scale,
            offset: Point::default(),
        };
        let scales = self.monitor_scales();
        if scales.is_empty() {
            metrics
        } else {
            scales.apply(metrics, Point::new(self.window_x, self.window_y))
        }
    }
}

fn parse_bpp(value: &str) -> Result<u32, String> {
    let bpp: u32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    match bpp {
        1 | 8 | 15 | 16 | 24 | 32 => Ok(bpp),
        _ => Err(format!("unsupported bits per pixel {}", bpp)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["rdpcursor"]);
        assert_eq!((args.width, args.height, args.bpp), (32, 32, 32));
        assert_eq!(args.pattern, Pattern::Arrow);
        assert!(args.content_scale.is_none());
        assert!(!args.no_hidpi_alternate);
    }

    #[test]
    fn test_bpp_validation() {
        assert!(Args::try_parse_from(["rdpcursor", "--bpp", "16"]).is_ok());
        assert!(Args::try_parse_from(["rdpcursor", "--bpp", "12"]).is_err());
    }

    #[test]
    fn test_xor_mask_requires_and_mask() {
        assert!(Args::try_parse_from(["rdpcursor", "--xor-mask", "x.bin"]).is_err());
        let args = ["rdpcursor", "--xor-mask", "x.bin", "--and-mask", "a.bin"];
        assert!(Args::try_parse_from(args).is_ok());
    }

    #[test]
    fn test_monitor_parsing() {
        assert_eq!(
            parse_monitor("3840x2160+-3840+0@2").unwrap(),
            MonitorArg {
                area: Rect::new(-3840, 0, 3840, 2160),
                scale: 2.0,
            }
        );
        assert!(parse_monitor("1920x1080@1").is_err());
        assert!(parse_monitor("1920x1080+0+0@0").is_err());
    }

    #[test]
    fn test_window_metrics_follow_monitor_layout() {
        let args = Args::parse_from([
            "rdpcursor",
            "--monitor",
            "1920x1080+0+0@1",
            "--monitor",
            "2560x1440+1920+0@1.5",
            "--window-x",
            "2000",
            "--display-scale",
            "3",
        ]);
        let metrics = args.window_metrics(WindowId(1), 1.25);
        assert_eq!(metrics.display_scale, 1.5);
        assert_eq!(metrics.content_scale, 1.25);
        assert_eq!(metrics.logical_size, Size::new(1280, 720));

        // outside every monitor: primary
        let args = Args::parse_from([
            "rdpcursor",
            "--monitor",
            "1920x1080+0+0@2",
            "--window-y",
            "-50",
        ]);
        assert_eq!(args.window_metrics(WindowId(1), 1.0).display_scale, 2.0);
    }

    #[test]
    fn test_window_metrics_without_layout() {
        let args = Args::parse_from(["rdpcursor", "--display-scale", "2"]);
        assert_eq!(args.window_metrics(WindowId(1), 1.0).display_scale, 2.0);
    }

    #[test]
    fn test_filter_conversion() {
        let args = Args::parse_from(["rdpcursor", "--filter", "nearest"]);
        assert_eq!(args.filter.map(ScaleFilter::from), Some(ScaleFilter::Nearest));
    }
}
