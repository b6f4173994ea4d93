pub mod html;
pub mod surface;

pub use html::HtmlPresenter;
pub use surface::RenderSurface;
