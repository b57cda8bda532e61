pub mod product;
pub mod settings;

// Re-export only the types we actually use
pub use product::{Product, ProductComponent, ProductDisplay, ProductTemplate, ProductType};
pub use settings::{
    PdfSettings, PdfSettingsUpdate, ProductSettings, ProductSettingsUpdate, WATERMARK_POSITIONS,
};
