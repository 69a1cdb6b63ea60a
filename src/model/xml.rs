//! XML Serialization Module
//!
//! quick-xmlの`Writer`を使用して`<product>`要素を出力するモジュール。
//! テキストと属性値のエスケープ（`& < > " '`）はquick-xmlが行います。

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

use super::product::{LocalizedString, ProductRecord};
use super::variation::Variations;
use crate::api::XmlOptions;
use crate::error::ImpexError;
use crate::types::format_number;

/// インデント幅に応じたライターを生成する（0の場合は改行なし）
pub(crate) fn new_writer(indent: usize) -> Writer<Vec<u8>> {
    if indent == 0 {
        Writer::new(Vec::new())
    } else {
        Writer::new_with_indent(Vec::new(), b' ', indent)
    }
}

/// ライターの内容を文字列として取り出す
pub(crate) fn finish(writer: Writer<Vec<u8>>) -> String {
    // 書き込むのは&strのみなので常にUTF-8
    String::from_utf8_lossy(&writer.into_inner()).into_owned()
}

pub(crate) fn write_declaration<W: Write>(writer: &mut Writer<W>) -> Result<(), ImpexError> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(())
}

pub(crate) fn write_start<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, &str)],
) -> Result<(), ImpexError> {
    writer.write_event(Event::Start(start_tag(name, attributes)))?;
    Ok(())
}

pub(crate) fn write_end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), ImpexError> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub(crate) fn write_empty<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, &str)],
) -> Result<(), ImpexError> {
    writer.write_event(Event::Empty(start_tag(name, attributes)))?;
    Ok(())
}

/// `<name attr="...">text</name>`を1行で出力する
pub(crate) fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, &str)],
    text: &str,
) -> Result<(), ImpexError> {
    write_start(writer, name, attributes)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    write_end(writer, name)
}

fn start_tag<'a>(name: &'a str, attributes: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for attribute in attributes {
        start.push_attribute(*attribute);
    }
    start
}

fn write_localized<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &LocalizedString,
) -> Result<(), ImpexError> {
    match &value.locale {
        Some(locale) => write_text_element(writer, name, &[("xml:lang", locale.as_str())], &value.value),
        None => write_text_element(writer, name, &[], &value.value),
    }
}

fn write_optional<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: Option<&str>,
) -> Result<(), ImpexError> {
    match value {
        Some(v) => write_text_element(writer, name, &[], v),
        None => Ok(()),
    }
}

fn write_optional_number<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: Option<f64>,
) -> Result<(), ImpexError> {
    match value {
        Some(n) => write_text_element(writer, name, &[], &format_number(n)),
        None => Ok(()),
    }
}

fn write_optional_bool<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: Option<bool>,
) -> Result<(), ImpexError> {
    match value {
        Some(b) => write_text_element(writer, name, &[], if b { "true" } else { "false" }),
        None => Ok(()),
    }
}

/// `<product>`要素を出力する
///
/// 子要素は固定順で出力し、`variations`が出力可能な場合は`</product>`の直前に
/// `<variations>`ブロックを出力します。
pub(crate) fn write_product<W: Write>(
    writer: &mut Writer<W>,
    product: &ProductRecord,
    variations: Option<&Variations>,
) -> Result<(), ImpexError> {
    write_start(writer, "product", &[("product-id", product.product_id())])?;

    if let Some(name) = &product.display_name {
        write_localized(writer, "display-name", name)?;
    }
    if let Some(description) = &product.short_description {
        write_localized(writer, "short-description", description)?;
    }
    if let Some(description) = &product.long_description {
        write_localized(writer, "long-description", description)?;
    }
    write_optional(writer, "brand", product.brand.as_deref())?;
    write_text_element(writer, "online-flag", &[], product.online_flag.as_str())?;
    write_text_element(writer, "available-flag", &[], product.available_flag.as_str())?;
    write_text_element(writer, "searchable-flag", &[], product.searchable_flag.as_str())?;
    write_optional(writer, "tax-class-id", product.tax_class_id.as_deref())?;

    if let Some(category) = &product.classification_category {
        match &category.catalog_id {
            Some(catalog_id) => write_text_element(
                writer,
                "classification-category",
                &[("catalog-id", catalog_id.as_str())],
                &category.category_id,
            )?,
            None => write_text_element(writer, "classification-category", &[], &category.category_id)?,
        }
    }

    let custom: Vec<_> = product
        .custom_attributes
        .iter()
        .filter(|a| !a.attribute_id.is_empty() && !a.value.is_empty())
        .collect();
    if !custom.is_empty() {
        write_start(writer, "custom-attributes", &[])?;
        for attribute in custom {
            write_text_element(
                writer,
                "custom-attribute",
                &[("attribute-id", attribute.attribute_id.as_str())],
                &attribute.value,
            )?;
        }
        write_end(writer, "custom-attributes")?;
    }

    write_optional(writer, "ean", product.ean.as_deref())?;
    write_optional(writer, "upc", product.upc.as_deref())?;
    write_optional(writer, "unit", product.unit.as_deref())?;
    write_optional_number(writer, "min-order-quantity", product.min_order_quantity)?;
    write_optional_number(writer, "step-quantity", product.step_quantity)?;
    write_optional(writer, "online-from", product.online_from.as_deref())?;
    write_optional_bool(writer, "sitemap-included-flag", product.sitemap_included_flag)?;
    write_optional(
        writer,
        "sitemap-changefrequency",
        product.sitemap_changefrequency.as_deref(),
    )?;
    write_optional_number(writer, "sitemap-priority", product.sitemap_priority)?;

    if let Some(page) = &product.page_attributes {
        let entries = page.entries();
        if !entries.is_empty() {
            write_start(writer, "page-attributes", &[])?;
            for (name, value) in entries {
                write_text_element(writer, name, &[], value)?;
            }
            write_end(writer, "page-attributes")?;
        }
    }

    if let Some(store) = &product.store_attributes {
        let entries = store.entries();
        if !entries.is_empty() {
            write_start(writer, "store-attributes", &[])?;
            for (name, value) in entries {
                write_text_element(writer, name, &[], if value { "true" } else { "false" })?;
            }
            write_end(writer, "store-attributes")?;
        }
    }

    write_optional(writer, "manufacturer-sku", product.manufacturer_sku.as_deref())?;
    write_optional_bool(writer, "pinterest-enabled-flag", product.pinterest_enabled_flag)?;
    write_optional_bool(writer, "facebook-enabled-flag", product.facebook_enabled_flag)?;

    if let Some(variations) = variations.filter(|v| v.is_renderable()) {
        write_variations(writer, variations)?;
    }

    write_end(writer, "product")
}

fn write_variations<W: Write>(writer: &mut Writer<W>, variations: &Variations) -> Result<(), ImpexError> {
    write_start(writer, "variations", &[])?;

    write_start(writer, "attributes", &[])?;
    for attribute in variations.attributes() {
        write_start(
            writer,
            "variation-attribute",
            &[
                ("attribute-id", attribute.attribute_id.as_str()),
                ("variation-attribute-id", attribute.attribute_id.as_str()),
            ],
        )?;
        write_localized(writer, "display-name", &attribute.display_name)?;
        write_start(writer, "variation-attribute-values", &[])?;
        for value in &attribute.values {
            write_start(writer, "variation-attribute-value", &[("value", value.value.as_str())])?;
            write_localized(writer, "display-value", &value.display_value)?;
            write_end(writer, "variation-attribute-value")?;
        }
        write_end(writer, "variation-attribute-values")?;
        write_end(writer, "variation-attribute")?;
    }
    write_end(writer, "attributes")?;

    write_start(writer, "variants", &[])?;
    for variant in variations.variants() {
        write_empty(writer, "variant", &[("product-id", variant.product_id.as_str())])?;
    }
    write_end(writer, "variants")?;

    write_end(writer, "variations")
}

/// 単独の`<product>`要素を文字列として生成する
pub(crate) fn render_fragment(
    product: &ProductRecord,
    variations: Option<&Variations>,
    options: XmlOptions,
) -> Result<String, ImpexError> {
    let mut writer = new_writer(options.indent);
    if options.include_declaration {
        write_declaration(&mut writer)?;
    }
    write_product(&mut writer, product, variations)?;
    Ok(finish(writer))
}
