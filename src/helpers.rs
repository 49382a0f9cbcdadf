pub mod chart_image;
pub mod charts;
pub mod converters;
pub mod html;
