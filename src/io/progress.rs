//! Progress display over the images of a compile pass

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static IMAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    let template = format!(
        "[{{elapsed_precise}}] Images: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
    );
    ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Single progress bar advancing once per catalog image
///
/// All methods take `&self`; the bar is shared with the compiler.
pub struct ProgressManager {
    bar: ProgressBar,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a hidden bar; it is shown once initialized
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Show the bar for `image_count` images
    pub fn initialize(&self, image_count: usize) {
        self.bar.set_length(image_count as u64);
        self.bar.set_position(0);
        self.bar.set_style(IMAGE_STYLE.clone());
        self.bar
            .set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    /// Mark one image as done
    pub fn advance(&self, image_name: &str) {
        self.bar.set_message(image_name.to_string());
        self.bar.inc(1);
    }

    /// Number of images marked done
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Clear the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
