use std::path::Path;

use console::Style;
use findoutlie_core::config::MetricsConfig;
use findoutlie_core::metrics::OutlierMetrics;
use findoutlie_core::volume::VolumeSeries;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    highlight: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            highlight: Style::new().yellow().bold(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_summary(input: &Path, series: &VolumeSeries, config: &MetricsConfig) {
    let s = Styles::new();
    let shape = series.frame_shape();
    let spacing = series.geometry.spacing;

    println!();
    println!("  {}", s.title.apply_to("FindOutlie Metrics"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(18)));
    println!();

    println!("  {:<14}{}", s.label.apply_to("Input"), s.path.apply_to(input.display()));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(series.frame_count())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Grid"),
        s.value.apply_to(format!("{}x{}x{}", shape[0], shape[1], shape[2]))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Spacing"),
        s.value.apply_to(format!(
            "{:.2} x {:.2} x {:.2} mm",
            spacing[0], spacing[1], spacing[2]
        ))
    );
    println!();

    println!("  {}", s.header.apply_to("Registration"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Reference"),
        s.method.apply_to("frame 0")
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Max iters"),
        s.value.apply_to(config.registration.max_iterations)
    );
    let step = match config.registration.max_step_mm {
        Some(mm) => format!("{mm:.3} mm"),
        None => format!("{:.3} mm (min spacing)", series.geometry.min_spacing()),
    };
    println!("    {:<12}{}", s.label.apply_to("Max step"), s.value.apply_to(step));
    println!();

    println!("  {}", s.header.apply_to("Displacement"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Norm"),
        s.method.apply_to(config.motion.norm)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Head radius"),
        s.value.apply_to(format!("{:.1} mm", config.motion.head_radius_mm))
    );
    println!();
}

pub fn print_metrics_summary(metrics: &OutlierMetrics) {
    let s = Styles::new();

    println!();
    if metrics.transition_count() == 0 {
        println!(
            "  {}",
            s.highlight.apply_to("Fewer than two frames: no transitions to score")
        );
        return;
    }

    println!(
        "  {:>5}  {:>12}  {:>10}",
        s.header.apply_to("Pair"),
        s.header.apply_to("DVARS"),
        s.header.apply_to("FD (mm)")
    );
    let worst_dvars = arg_max(&metrics.dvars);
    let worst_fd = arg_max(&metrics.framewise_displacement);
    for (t, (d, fd)) in metrics
        .dvars
        .iter()
        .zip(&metrics.framewise_displacement)
        .enumerate()
    {
        let dvars_cell = format!("{:>12.4}", d);
        let fd_cell = format!("{:>10.4}", fd);
        println!(
            "  {:>2}-{:<2}  {}  {}",
            t,
            t + 1,
            if Some(t) == worst_dvars {
                s.highlight.apply_to(dvars_cell)
            } else {
                s.value.apply_to(dvars_cell)
            },
            if Some(t) == worst_fd {
                s.highlight.apply_to(fd_cell)
            } else {
                s.value.apply_to(fd_cell)
            },
        );
    }
}

/// Index of the largest value; NaN sorts above every number.
pub fn arg_max(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}
