//! Catalog Output Module
//!
//! 有効な商品とカタログヘッダー情報から、完全なカタログXMLドキュメントを生成する。
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <catalog xmlns="..." catalog-id="...">
//!   <header>
//!     <default-locale>...</default-locale>
//!     <default-currency>...</default-currency>
//!     <image-settings>...</image-settings>
//!   </header>
//!   <product product-id="...">...</product>
//! </catalog>
//! ```

use quick_xml::Writer;
use std::io::Write;

use crate::error::ImpexError;
use crate::mapping::{CatalogHeader, ImageSettings};
use crate::model::xml::{
    finish, new_writer, write_declaration, write_empty, write_end, write_product, write_start,
    write_text_element,
};
use crate::model::CatalogProduct;

/// カタログドキュメントの出力器
#[derive(Debug, Clone, Copy)]
pub(crate) struct CatalogDocument<'a> {
    header: &'a CatalogHeader,
    indent: usize,
}

impl<'a> CatalogDocument<'a> {
    pub fn new(header: &'a CatalogHeader, indent: usize) -> Self {
        Self { header, indent }
    }

    /// 商品を入力順にカタログXMLとして出力する
    pub fn render<'p, I>(&self, products: I) -> Result<String, ImpexError>
    where
        I: IntoIterator<Item = &'p CatalogProduct>,
    {
        let mut writer = new_writer(self.indent);
        write_declaration(&mut writer)?;
        write_start(
            &mut writer,
            "catalog",
            &[
                ("xmlns", self.header.namespace.as_str()),
                ("catalog-id", self.header.catalog_id.as_str()),
            ],
        )?;

        self.write_header(&mut writer)?;
        for product in products {
            write_product(&mut writer, &product.product, product.variations.as_ref())?;
        }

        write_end(&mut writer, "catalog")?;
        Ok(finish(writer))
    }

    fn write_header<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), ImpexError> {
        write_start(writer, "header", &[])?;
        if !self.header.default_locale.is_empty() {
            write_text_element(writer, "default-locale", &[], &self.header.default_locale)?;
        }
        if !self.header.default_currency.is_empty() {
            write_text_element(writer, "default-currency", &[], &self.header.default_currency)?;
        }
        if let Some(images) = &self.header.image_settings {
            write_image_settings(writer, images)?;
        }
        write_end(writer, "header")
    }
}

fn write_image_settings<W: Write>(writer: &mut Writer<W>, images: &ImageSettings) -> Result<(), ImpexError> {
    write_start(writer, "image-settings", &[])?;
    write_empty(
        writer,
        "internal-location",
        &[("base-path", images.internal_location.base_path.as_str())],
    )?;

    if !images.view_types.is_empty() {
        write_start(writer, "view-types", &[])?;
        for view_type in &images.view_types {
            write_text_element(writer, "view-type", &[], view_type)?;
        }
        write_end(writer, "view-types")?;
    }

    if let Some(id) = &images.variation_attribute_id {
        write_text_element(writer, "variation-attribute-id", &[], id)?;
    }
    if let Some(pattern) = &images.alt_pattern {
        write_text_element(writer, "alt-pattern", &[], pattern)?;
    }
    if let Some(pattern) = &images.title_pattern {
        write_text_element(writer, "title-pattern", &[], pattern)?;
    }
    write_end(writer, "image-settings")
}
