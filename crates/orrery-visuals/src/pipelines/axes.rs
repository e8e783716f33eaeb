use super::line::{JoinStyle, LineParams, LineWidth};

/// Parameters to configure the reference axes
/// drawn through the world origin.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AxesParams {
    /// How far each axis line extends from the origin in both directions,
    /// in world units.
    pub half_extent: f32,
    /// Width of the axis lines.
    pub width: LineWidth,
}

impl Default for AxesParams {
    fn default() -> Self {
        Self {
            half_extent: 100.0,
            width: LineWidth::ScreenPixels(2.0),
        }
    }
}

// X red, Y green, Z blue, in linear sRGB
const AXIS_COLORS: [[f32; 3]; 3] = [[0.8, 0.1, 0.1], [0.1, 0.8, 0.1], [0.1, 0.2, 0.8]];

pub(crate) fn axes_3d(painter: &mut super::Painter, params: AxesParams) {
    for (axis_idx, color) in AXIS_COLORS.iter().enumerate() {
        let mut endpoints = [[0.0_f32; 3]; 2];
        endpoints[0][axis_idx] = -params.half_extent;
        endpoints[1][axis_idx] = params.half_extent;

        painter.line_list(
            LineParams {
                width: params.width,
                color: palette::LinSrgb::new(color[0], color[1], color[2]),
                joins: JoinStyle::None,
            },
            &endpoints,
        );
    }
}
