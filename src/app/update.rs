//! Per-frame rendering of the chart window.
//!
//! Each frame runs the refresh tick when it is due, draws the curves and the
//! optional overlays, then feeds pointer and context-menu input back into
//! [`ChartController`].

use std::time::Instant;

use eframe::egui;
use egui::{Color32, PointerButton};
use egui_plot::{GridMark, HLine, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoint, Points, VLine};

use crate::data::view::ViewRect;
use crate::data::x_formatter::TimeFormatter;

use super::ChartController;

/// Screen distance (points) within which a press grabs a control point.
const HANDLE_PICK_RADIUS: f32 = 10.0;

const FIT_COLOR: Color32 = Color32::from_rgb(255, 215, 0);
const REGION_COLOR: Color32 = Color32::LIGHT_GRAY;
const CROSSHAIR_COLOR: Color32 = Color32::from_rgb(200, 200, 200);

/// What the plot closure observed this frame.
struct PlotFrame {
    view: ViewRect,
    pointer: Option<PlotPoint>,
    handle_hit: Option<usize>,
    drag_started: bool,
    dragging: bool,
    drag_stopped: bool,
    clicked: bool,
}

impl eframe::App for ChartController {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.tick_if_due(Instant::now());
        ctx.request_repaint_after(self.time_until_next_tick(Instant::now()));

        if self.crosshair_enabled() {
            egui::TopBottomPanel::top("crosshair_readout").show(ctx, |ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let text = self.crosshair_label().unwrap_or_default();
                    ui.label(egui::RichText::new(text).size(16.0));
                });
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| self.render_plot(ui));
    }
}

impl ChartController {
    fn render_plot(&mut self, ui: &mut egui::Ui) {
        let formatter = TimeFormatter::default();
        let fit_active = self.fit_active();
        let freeze = self.take_freeze_view_request();
        let (shift, press_origin) = ui.input(|i| (i.modifiers.shift, i.pointer.press_origin()));

        let plot = Plot::new("pressure_plot")
            .legend(Legend::default())
            .allow_drag(!fit_active)
            .allow_boxed_zoom(true)
            .x_axis_formatter(move |mark: GridMark, _range| {
                formatter.format_tick(mark.value, mark.step_size)
            });

        let plot_resp = plot.show(ui, |plot_ui| {
            if freeze {
                let b = plot_ui.plot_bounds();
                plot_ui.set_plot_bounds_x(b.range_x());
                plot_ui.set_plot_bounds_y(b.range_y());
            }

            for curve in self.curves() {
                plot_ui.line(
                    Line::new(curve.name(), curve.points.clone())
                        .color(curve.color)
                        .width(curve.width),
                );
            }

            let mut handle_hit = None;
            if let Some(fit) = self.fit_overlay() {
                if !fit.fitted().is_empty() {
                    plot_ui.line(Line::new("Fit", fit.fitted().to_vec()).color(FIT_COLOR).width(2.0));
                }
                let region = fit.control_points().to_vec();
                plot_ui.line(
                    Line::new("", region.clone())
                        .color(REGION_COLOR)
                        .style(LineStyle::dashed_loose()),
                );
                plot_ui.points(
                    Points::new("", region.clone())
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(5.0)
                        .color(REGION_COLOR),
                );

                if let Some(origin) = press_origin {
                    handle_hit = region
                        .iter()
                        .enumerate()
                        .map(|(i, p)| {
                            let screen = plot_ui.screen_from_plot(PlotPoint::new(p[0], p[1]));
                            (i, screen.distance(origin))
                        })
                        .filter(|(_, d)| *d <= HANDLE_PICK_RADIUS)
                        .min_by(|a, b| a.1.total_cmp(&b.1))
                        .map(|(i, _)| i);
                }
            }

            if self.crosshair_enabled() {
                if let Some([x, y]) = self.cursor() {
                    plot_ui.vline(VLine::new("", x).color(CROSSHAIR_COLOR));
                    plot_ui.hline(HLine::new("", y).color(CROSSHAIR_COLOR));
                }
            }

            let bounds = plot_ui.plot_bounds();
            let [x_min, y_min] = bounds.min();
            let [x_max, y_max] = bounds.max();
            let response = plot_ui.response();
            PlotFrame {
                view: ViewRect {
                    x: (x_min, x_max),
                    y: (y_min, y_max),
                },
                pointer: plot_ui.pointer_coordinate(),
                handle_hit,
                drag_started: response.drag_started_by(PointerButton::Primary),
                dragging: response.dragged_by(PointerButton::Primary),
                drag_stopped: response.drag_stopped(),
                clicked: response.clicked(),
            }
        });

        let frame = plot_resp.inner;
        self.set_view(frame.view);
        if let Some(p) = frame.pointer {
            self.on_pointer_move([p.x, p.y]);
        }
        if fit_active {
            self.handle_region_input(&frame, shift);
        }

        plot_resp.response.context_menu(|ui| {
            let mut enabled = self.fit_active();
            if ui.checkbox(&mut enabled, "Fit region").changed() {
                tracing::info!("fit overlay {}", if enabled { "enabled" } else { "disabled" });
                self.on_fit_toggle(enabled);
                ui.close();
            }
        });
    }

    fn handle_region_input(&mut self, frame: &PlotFrame, shift: bool) {
        if frame.drag_started {
            self.dragging = frame.handle_hit;
        }
        if frame.dragging {
            if let (Some(index), Some(p)) = (self.dragging, frame.pointer) {
                self.move_fit_point(index, [p.x, p.y]);
            }
        }
        if frame.drag_stopped {
            self.dragging = None;
        }
        if frame.clicked && shift && frame.handle_hit.is_none() {
            if let Some(p) = frame.pointer {
                self.insert_fit_point([p.x, p.y]);
            }
        }
    }
}
