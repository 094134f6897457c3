//! Window settings and the renderer shown in it.

use vizkit_core::Options;

use crate::renderer::Renderer;

/// A window to be opened by a [`RenderWindowInteractor`](crate::RenderWindowInteractor).
#[derive(Debug)]
pub struct RenderWindow {
    renderer: Renderer,
    size: (u32, u32),
    title: String,
    vsync: bool,
}

impl Default for RenderWindow {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

impl RenderWindow {
    /// Creates an 800x800 window with an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a window sized and titled from `options`, with the
    /// background color applied to its renderer.
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        let mut renderer = Renderer::new();
        let bg = options.background_color;
        renderer.set_background(bg.x, bg.y, bg.z);
        Self {
            renderer,
            size: (options.window_width.max(1), options.window_height.max(1)),
            title: options.title.clone(),
            vsync: options.vsync,
        }
    }

    /// Replaces the renderer.
    pub fn set_renderer(&mut self, renderer: Renderer) {
        self.renderer = renderer;
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// The renderer, for modification.
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Requested inner size in logical pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Sets the requested size. Zero dimensions are raised to one.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width.max(1), height.max(1));
    }

    /// Window title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Sets the window title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Whether presentation waits for vertical sync.
    #[must_use]
    pub fn vsync(&self) -> bool {
        self.vsync
    }

    pub(crate) fn into_parts(self) -> (Renderer, (u32, u32), String, bool) {
        (self.renderer, self.size, self.title, self.vsync)
    }
}
