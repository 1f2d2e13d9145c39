//! Pointer/touch → surface coordinate mapping
//!
//! Stateless. The browser reports client coordinates in CSS pixels relative
//! to the viewport; the session works in the logical surface space of the
//! canvas. When the two sizes differ (CSS scaling, zoom) the offset is
//! scaled per axis.

use glam::Vec2;

/// The canvas bounding rectangle in client coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ClientRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Map a client point onto the surface. `None` if the canvas has no area.
///
/// Points outside the canvas are still mapped; the session treats them as
/// misses.
pub fn client_to_surface(client: Vec2, rect: &ClientRect, surface: Vec2) -> Option<Vec2> {
    if !(rect.width > 0.0 && rect.height > 0.0) {
        return None;
    }
    let scale = Vec2::new(surface.x / rect.width, surface.y / rect.height);
    let offset = client - Vec2::new(rect.left, rect.top);
    Some(offset * scale)
}

/// Collapse a multi-touch event to its first touch point
#[inline]
pub fn first_touch(points: &[Vec2]) -> Option<Vec2> {
    points.first().copied()
}

#[cfg(target_arch = "wasm32")]
pub use web::{canvas_rect, mouse_to_surface, touch_to_surface};

#[cfg(target_arch = "wasm32")]
mod web {
    use glam::Vec2;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use super::{ClientRect, client_to_surface, first_touch};

    pub fn canvas_rect(canvas: &HtmlCanvasElement) -> ClientRect {
        let rect = canvas.get_bounding_client_rect();
        ClientRect::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }

    pub fn mouse_to_surface(
        event: &MouseEvent,
        canvas: &HtmlCanvasElement,
        surface: Vec2,
    ) -> Option<Vec2> {
        let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
        client_to_surface(client, &canvas_rect(canvas), surface)
    }

    pub fn touch_to_surface(
        event: &TouchEvent,
        canvas: &HtmlCanvasElement,
        surface: Vec2,
    ) -> Option<Vec2> {
        let touches = event.touches();
        let points: Vec<Vec2> = (0..touches.length())
            .filter_map(|i| touches.get(i))
            .map(|t| Vec2::new(t.client_x() as f32, t.client_y() as f32))
            .collect();
        let client = first_touch(&points)?;
        client_to_surface(client, &canvas_rect(canvas), surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unscaled_offset() {
        let rect = ClientRect::new(10.0, 20.0, 800.0, 600.0);
        let p = client_to_surface(Vec2::new(110.0, 220.0), &rect, Vec2::new(800.0, 600.0));
        assert_eq!(p, Some(Vec2::new(100.0, 200.0)));
    }

    #[test]
    fn test_scaled_surface() {
        // Canvas rendered at half its logical size
        let rect = ClientRect::new(0.0, 0.0, 400.0, 300.0);
        let p = client_to_surface(Vec2::new(100.0, 150.0), &rect, Vec2::new(800.0, 600.0));
        assert_eq!(p, Some(Vec2::new(200.0, 300.0)));
    }

    #[test]
    fn test_outside_canvas_still_maps() {
        let rect = ClientRect::new(50.0, 50.0, 100.0, 100.0);
        let p = client_to_surface(Vec2::new(0.0, 0.0), &rect, Vec2::new(100.0, 100.0));
        assert_eq!(p, Some(Vec2::new(-50.0, -50.0)));
    }

    #[test]
    fn test_zero_sized_rect() {
        let rect = ClientRect::new(0.0, 0.0, 0.0, 300.0);
        assert_eq!(
            client_to_surface(Vec2::new(1.0, 1.0), &rect, Vec2::new(800.0, 600.0)),
            None
        );
        let rect = ClientRect::new(0.0, 0.0, f32::NAN, 300.0);
        assert_eq!(
            client_to_surface(Vec2::new(1.0, 1.0), &rect, Vec2::new(800.0, 600.0)),
            None
        );
    }

    #[test]
    fn test_first_touch_wins() {
        let touches = [Vec2::new(5.0, 6.0), Vec2::new(100.0, 100.0)];
        assert_eq!(first_touch(&touches), Some(Vec2::new(5.0, 6.0)));
        assert_eq!(first_touch(&[]), None);
    }
}
