use crate::events::model::ImageRef;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselMode {
    /// No images
    Idle,
    /// Inline strip
    Browsing(usize),
    /// Full-screen viewer
    Viewing(usize),
}

/// What the detail screen renders the photo strip and viewer from
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselState {
    pub images: Vec<ImageRef>,
    pub active_index: usize,
    pub viewer_open: bool,
}

pub struct MediaCarouselController {
    images: Vec<ImageRef>,
    active_index: usize,
    viewer_open: bool,
}

impl MediaCarouselController {
    pub fn new(images: Vec<ImageRef>) -> Self {
        Self {
            images,
            active_index: 0,
            viewer_open: false,
        }
    }

    /// Replaces the image set, e.g. once details arrive. Closes the viewer and
    /// rewinds to the first image.
    pub fn set_images(&mut self, images: Vec<ImageRef>) {
        self.images = images;
        self.active_index = 0;
        self.viewer_open = false;
    }

    pub fn mode(&self) -> CarouselMode {
        if self.images.is_empty() {
            CarouselMode::Idle
        } else if self.viewer_open {
            CarouselMode::Viewing(self.active_index)
        } else {
            CarouselMode::Browsing(self.active_index)
        }
    }

    pub fn state(&self) -> CarouselState {
        CarouselState {
            images: self.images.clone(),
            active_index: self.active_index,
            viewer_open: self.viewer_open,
        }
    }

    pub fn active_image(&self) -> Option<&ImageRef> {
        self.images.get(self.active_index)
    }

    /// Tap on the inline image at `index` opens the viewer on it
    pub fn tap_inline(&mut self, index: usize) {
        if self.images.is_empty() {
            trace!("Ignoring tap without images");
            return;
        }

        if self.viewer_open {
            return;
        }

        self.active_index = self.clamp(index);
        self.viewer_open = true;

        debug!("Opened viewer at {}", self.active_index);
    }

    /// Tap inside the viewer, same as dismissing it
    pub fn tap_viewer(&mut self) {
        self.dismiss();
    }

    /// Closes the viewer, keeping the image it was showing
    pub fn dismiss(&mut self) {
        if self.viewer_open {
            debug!("Closed viewer at {}", self.active_index);
        }

        self.viewer_open = false;
    }

    /// The inline strip stopped scrolling at `offset`
    pub fn settle_inline(&mut self, offset: f32, page_width: f32) {
        if self.viewer_open {
            return;
        }

        self.settle(offset, page_width);
    }

    /// The full-screen viewer stopped scrolling at `offset`
    pub fn settle_viewer(&mut self, offset: f32, page_width: f32) {
        if !self.viewer_open {
            return;
        }

        self.settle(offset, page_width);
    }

    /// Offset that puts the active image in view, for positioning either strip
    pub fn scroll_offset(&self, page_width: f32) -> f32 {
        self.active_index as f32 * page_width
    }

    fn settle(&mut self, offset: f32, page_width: f32) {
        if self.images.is_empty() {
            return;
        }

        match page_for_offset(offset, page_width) {
            Some(page) => self.active_index = self.clamp(page),
            None => warn!(
                "Ignoring settle at offset {} with page width {}",
                offset, page_width
            ),
        }
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.images.len().saturating_sub(1))
    }
}

/// Nearest page to a scroll offset. Rounds, so an offset just short of a page
/// boundary lands on that page instead of the previous one.
fn page_for_offset(offset: f32, page_width: f32) -> Option<usize> {
    if !offset.is_finite() || !page_width.is_finite() || page_width <= 0.0 {
        return None;
    }

    Some((offset / page_width).round().max(0.0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f32 = 360.0;

    fn images(count: usize) -> Vec<ImageRef> {
        (0..count)
            .filter_map(|i| ImageRef::new(&format!("event/{i}.jpg")))
            .collect()
    }

    #[test_log::test]
    fn without_images_should_stay_idle() {
        let mut carousel = MediaCarouselController::new(Vec::new());

        carousel.tap_inline(0);
        carousel.settle_inline(WIDTH, WIDTH);

        assert_eq!(carousel.mode(), CarouselMode::Idle);
        assert!(!carousel.state().viewer_open);
    }

    #[test_log::test]
    fn tap_should_open_viewer_on_that_image() {
        let mut carousel = MediaCarouselController::new(images(3));

        carousel.tap_inline(2);

        assert_eq!(carousel.mode(), CarouselMode::Viewing(2));
        assert_eq!(carousel.active_image(), images(3).get(2));
    }

    #[test_log::test]
    fn tap_out_of_bounds_should_clamp() {
        let mut carousel = MediaCarouselController::new(images(3));

        carousel.tap_inline(7);

        assert_eq!(carousel.mode(), CarouselMode::Viewing(2));
    }

    #[test_log::test]
    fn settle_should_round_to_nearest_page() {
        let mut carousel = MediaCarouselController::new(images(4));

        carousel.settle_inline(WIDTH * 1.6, WIDTH);
        assert_eq!(carousel.mode(), CarouselMode::Browsing(2));

        carousel.settle_inline(WIDTH * 1.4, WIDTH);
        assert_eq!(carousel.mode(), CarouselMode::Browsing(1));

        carousel.settle_inline(WIDTH * 2.0 - 0.5, WIDTH);
        assert_eq!(carousel.mode(), CarouselMode::Browsing(2));
    }

    #[test_log::test]
    fn settle_should_clamp_to_bounds() {
        let mut carousel = MediaCarouselController::new(images(2));

        carousel.settle_inline(WIDTH * 9.0, WIDTH);
        assert_eq!(carousel.mode(), CarouselMode::Browsing(1));

        carousel.settle_inline(-WIDTH * 3.0, WIDTH);
        assert_eq!(carousel.mode(), CarouselMode::Browsing(0));
    }

    #[test_log::test]
    fn invalid_geometry_should_be_ignored() {
        let mut carousel = MediaCarouselController::new(images(3));
        carousel.settle_inline(WIDTH, WIDTH);

        carousel.settle_inline(f32::NAN, WIDTH);
        carousel.settle_inline(WIDTH * 2.0, 0.0);

        assert_eq!(carousel.mode(), CarouselMode::Browsing(1));
    }

    #[test_log::test]
    fn viewer_position_should_carry_back_to_strip() {
        let mut carousel = MediaCarouselController::new(images(5));

        carousel.tap_inline(1);
        carousel.settle_viewer(WIDTH * 3.0, WIDTH);
        assert_eq!(carousel.mode(), CarouselMode::Viewing(3));

        carousel.dismiss();

        assert_eq!(carousel.mode(), CarouselMode::Browsing(3));
        assert_eq!(carousel.scroll_offset(WIDTH), WIDTH * 3.0);
    }

    #[test_log::test]
    fn strip_settle_should_not_move_open_viewer() {
        let mut carousel = MediaCarouselController::new(images(3));

        carousel.tap_inline(0);
        carousel.settle_inline(WIDTH * 2.0, WIDTH);

        assert_eq!(carousel.mode(), CarouselMode::Viewing(0));

        carousel.tap_viewer();
        carousel.settle_viewer(WIDTH * 2.0, WIDTH);

        assert_eq!(carousel.mode(), CarouselMode::Browsing(0));
    }

    #[test_log::test]
    fn replacing_images_should_rewind() {
        let mut carousel = MediaCarouselController::new(Vec::new());

        carousel.set_images(images(3));
        assert_eq!(carousel.mode(), CarouselMode::Browsing(0));

        carousel.tap_inline(2);
        carousel.set_images(Vec::new());

        assert_eq!(carousel.mode(), CarouselMode::Idle);
    }

    #[test_log::test]
    fn index_should_stay_in_bounds_for_any_sequence() {
        let mut carousel = MediaCarouselController::new(images(3));
        let offsets = [-1000.0, 0.0, 179.0, 181.0, 359.9, 720.0, 5000.0, f32::INFINITY];

        for (i, offset) in offsets.iter().enumerate() {
            carousel.tap_inline(i);
            carousel.settle_viewer(*offset, WIDTH);
            carousel.dismiss();
            carousel.settle_inline(*offset, WIDTH);

            let state = carousel.state();
            assert!(state.active_index < state.images.len(), "{:?}", state);
            assert!(!state.viewer_open);
        }
    }
}
