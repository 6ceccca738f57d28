mod controls;
mod header;
mod info_panel;
mod legend;
mod navigator;
mod scenes;
mod stage;

pub use controls::Controls;
pub use header::Header;
pub use info_panel::InfoPanel;
pub use legend::Legend;
pub use navigator::Navigator;
pub use stage::Stage;
