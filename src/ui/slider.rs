//! Screen-space slider widgets drawn with egui

use glam::Vec2;

use super::{ParameterId, SliderHandler};
use crate::colors::{self, NamedColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderOrientation {
    Horizontal,
    Vertical,
}

/// Geometry, range and colours of one slider.
///
/// Endpoints and sizes are fractions of the window, endpoints measured from
/// the bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderRepresentation {
    pub title: String,
    pub minimum: f32,
    pub maximum: f32,
    value: f32,
    pub point1: Vec2,
    pub point2: Vec2,
    pub tube_width: f32,
    pub slider_length: f32,
    pub title_height: f32,
    pub label_height: f32,
    pub title_color: NamedColor,
    pub label_color: NamedColor,
    pub slider_color: NamedColor,
    pub selected_color: NamedColor,
    pub tube_color: NamedColor,
    pub cap_color: NamedColor,
}

impl Default for SliderRepresentation {
    fn default() -> Self {
        Self {
            title: String::new(),
            minimum: 0.0,
            maximum: 1.0,
            value: 0.0,
            point1: Vec2::new(0.1, 0.1),
            point2: Vec2::new(0.9, 0.1),
            tube_width: 0.008,
            slider_length: 0.008,
            title_height: 0.025,
            label_height: 0.025,
            title_color: colors::MISTY_ROSE,
            label_color: colors::CYAN,
            slider_color: colors::CORAL,
            selected_color: colors::LIME,
            tube_color: colors::PEACH_PUFF,
            cap_color: colors::THISTLE,
        }
    }
}

impl SliderRepresentation {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_range(mut self, minimum: f32, maximum: f32) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self.value = self.value.clamp(minimum, maximum);
        self
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_endpoints(mut self, point1: Vec2, point2: Vec2) -> Self {
        self.point1 = point1;
        self.point2 = point2;
        self
    }

    pub fn with_text_heights(mut self, title_height: f32, label_height: f32) -> Self {
        self.title_height = title_height;
        self.label_height = label_height;
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Store `value` clamped to the slider range and return what was stored.
    pub fn set_value(&mut self, value: f32) -> f32 {
        self.value = value.clamp(self.minimum, self.maximum);
        self.value
    }

    /// Position of the value along the tube, in [0, 1]
    pub fn fraction(&self) -> f32 {
        let span = self.maximum - self.minimum;
        if span <= 0.0 {
            0.0
        } else {
            (self.value - self.minimum) / span
        }
    }

    /// Vertical when the endpoints differ more in y than in x
    pub fn orientation(&self) -> SliderOrientation {
        let d = self.point2 - self.point1;
        if d.y.abs() > d.x.abs() {
            SliderOrientation::Vertical
        } else {
            SliderOrientation::Horizontal
        }
    }

    /// Endpoints in egui points for a screen of `size`, top-left origin.
    pub fn screen_endpoints(&self, size: egui::Vec2) -> (egui::Pos2, egui::Pos2) {
        let to_screen = |p: Vec2| egui::pos2(p.x * size.x, (1.0 - p.y) * size.y);
        (to_screen(self.point1), to_screen(self.point2))
    }
}

/// A slider bound to one parameter
#[derive(Debug, Clone, PartialEq)]
pub struct SliderWidget {
    pub parameter: ParameterId,
    pub representation: SliderRepresentation,
}

impl SliderWidget {
    pub fn new(parameter: ParameterId, representation: SliderRepresentation) -> Self {
        Self {
            parameter,
            representation,
        }
    }

    /// Draw the widget and return the new value if the user moved it.
    fn show(&self, ctx: &egui::Context, index: usize) -> Option<f32> {
        let repr = &self.representation;
        let screen = ctx.screen_rect();
        let (p1, p2) = repr.screen_endpoints(screen.size());
        let length = (p2 - p1).length().max(1.0);
        let center = screen.min + ((p1.to_vec2() + p2.to_vec2()) * 0.5);
        let title_size = (repr.title_height * screen.height()).max(8.0);
        let label_size = (repr.label_height * screen.height()).max(8.0);
        let tube_px = (repr.tube_width * screen.height()).max(4.0);
        let handle_px = (repr.slider_length * screen.height()).max(6.0);

        let mut value = repr.value();
        let inner = egui::Area::new(egui::Id::new(("material_slider", index)))
            .order(egui::Order::Foreground)
            .fixed_pos(center)
            .pivot(egui::Align2::CENTER_CENTER)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new(format!("{value:.2}"))
                            .size(label_size)
                            .color(repr.label_color.to_egui()),
                    );

                    let spacing = ui.spacing_mut();
                    spacing.slider_width = length;
                    spacing.interact_size.y = handle_px.max(tube_px);

                    let visuals = ui.visuals_mut();
                    visuals.widgets.inactive.bg_fill = repr.tube_color.to_egui();
                    visuals.widgets.inactive.fg_stroke =
                        egui::Stroke::new(2.0, repr.slider_color.to_egui());
                    visuals.widgets.hovered.bg_fill = repr.slider_color.to_egui();
                    visuals.widgets.active.bg_fill = repr.selected_color.to_egui();
                    visuals.selection.bg_fill = repr.tube_color.to_egui();

                    let mut slider = egui::Slider::new(&mut value, repr.minimum..=repr.maximum)
                        .show_value(false)
                        .trailing_fill(true);
                    if repr.orientation() == SliderOrientation::Vertical {
                        slider = slider.vertical();
                    }
                    let response = ui.add(slider);

                    let caps = match repr.orientation() {
                        SliderOrientation::Horizontal => {
                            [response.rect.left_center(), response.rect.right_center()]
                        }
                        SliderOrientation::Vertical => {
                            [response.rect.center_top(), response.rect.center_bottom()]
                        }
                    };
                    for cap in caps {
                        ui.painter()
                            .circle_filled(cap, tube_px * 0.75, repr.cap_color.to_egui());
                    }

                    ui.label(
                        egui::RichText::new(&repr.title)
                            .size(title_size)
                            .color(repr.title_color.to_egui()),
                    );
                    response.changed()
                })
                .inner
            });

        inner.inner.then_some(value)
    }
}

/// Owns the sliders and forwards their changes to one handler
pub struct SliderController {
    widgets: Vec<SliderWidget>,
    handler: Box<dyn SliderHandler>,
}

impl SliderController {
    pub fn new(widgets: Vec<SliderWidget>, handler: Box<dyn SliderHandler>) -> Self {
        Self { widgets, handler }
    }

    pub fn widgets(&self) -> &[SliderWidget] {
        &self.widgets
    }

    /// Move slider `index` to `value` and notify the handler with the
    /// clamped value.
    pub fn set_value(&mut self, index: usize, value: f32) {
        let Some(widget) = self.widgets.get_mut(index) else {
            return;
        };
        let value = widget.representation.set_value(value);
        self.handler.on_value_changed(widget.parameter, value);
    }

    /// Draw every slider and dispatch the ones the user moved.
    pub fn show(&mut self, ctx: &egui::Context) {
        let changes: Vec<(usize, f32)> = self
            .widgets
            .iter()
            .enumerate()
            .filter_map(|(index, widget)| widget.show(ctx, index).map(|value| (index, value)))
            .collect();
        for (index, value) in changes {
            self.set_value(index, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    struct Recorder(Arc<Mutex<Vec<(ParameterId, f32)>>>);

    impl SliderHandler for Recorder {
        fn on_value_changed(&mut self, parameter: ParameterId, value: f32) {
            self.0.lock().push((parameter, value));
        }
    }

    #[test]
    fn test_set_value_clamps() {
        let mut repr = SliderRepresentation::new("Normal").with_range(0.0, 5.0);
        assert_eq!(repr.set_value(7.5), 5.0);
        assert_eq!(repr.set_value(-1.0), 0.0);
        assert_eq!(repr.set_value(2.5), 2.5);
        assert_eq!(repr.fraction(), 0.5);
    }

    #[test]
    fn test_orientation_from_endpoints() {
        let horizontal = SliderRepresentation::default()
            .with_endpoints(Vec2::new(0.2, 0.1), Vec2::new(0.8, 0.1));
        let vertical = SliderRepresentation::default()
            .with_endpoints(Vec2::new(0.1, 0.2), Vec2::new(0.1, 0.8));
        assert_eq!(horizontal.orientation(), SliderOrientation::Horizontal);
        assert_eq!(vertical.orientation(), SliderOrientation::Vertical);
    }

    #[test]
    fn test_screen_endpoints_flip_y() {
        let repr = SliderRepresentation::default()
            .with_endpoints(Vec2::new(0.25, 0.0), Vec2::new(0.75, 1.0));
        let (p1, p2) = repr.screen_endpoints(egui::vec2(800.0, 500.0));
        assert_eq!(p1, egui::pos2(200.0, 500.0));
        assert_eq!(p2, egui::pos2(600.0, 0.0));
    }

    #[test]
    fn test_defaults_match_widget_style() {
        let repr = SliderRepresentation::default();
        assert_eq!(repr.tube_width, 0.008);
        assert_eq!(repr.slider_length, 0.008);
        assert_eq!((repr.minimum, repr.maximum), (0.0, 1.0));
        assert_eq!(repr.title_color, colors::MISTY_ROSE);
        assert_eq!(repr.selected_color, colors::LIME);
        assert_eq!(repr.cap_color, colors::THISTLE);
    }

    #[test]
    fn test_controller_dispatches_clamped_values() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let widgets = vec![
            SliderWidget::new(ParameterId::Metallic, SliderRepresentation::new("Metallicity")),
            SliderWidget::new(
                ParameterId::NormalScale,
                SliderRepresentation::new("Normal").with_range(0.0, 5.0),
            ),
        ];
        let mut controller = SliderController::new(widgets, Box::new(Recorder(Arc::clone(&log))));

        controller.set_value(0, 1.7);
        controller.set_value(1, 3.0);
        controller.set_value(9, 0.5);

        assert_eq!(
            *log.lock(),
            vec![(ParameterId::Metallic, 1.0), (ParameterId::NormalScale, 3.0)]
        );
        assert_eq!(controller.widgets()[0].representation.value(), 1.0);
    }

    #[test]
    fn test_show_without_input_changes_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let widgets = vec![SliderWidget::new(
            ParameterId::Roughness,
            SliderRepresentation::new("Roughness").with_value(0.4),
        )];
        let mut controller = SliderController::new(widgets, Box::new(Recorder(Arc::clone(&log))));

        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| controller.show(ctx));

        assert!(log.lock().is_empty());
        assert_eq!(controller.widgets()[0].representation.value(), 0.4);
    }
}
