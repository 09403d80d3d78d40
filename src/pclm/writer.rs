use lopdf::{Document, Object, Stream, dictionary};

use crate::error::PclmError;
use crate::pclm::encoder::EncodedStrip;
use crate::raster::{ColorSpace, PageHeader};

/// Points per inch in page coordinate space.
const PDF_UNIT: f64 = 72.0;

/// Handle for a page that has been opened but not yet assembled. The page
/// object and its content stream already exist in the document as
/// placeholders; `finish_page` fills both in.
#[derive(Debug)]
pub struct OpenPage {
    page_id: lopdf::ObjectId,
    content_id: lopdf::ObjectId,
    pixel_width: u32,
    pixel_height: u32,
}

/// Incremental assembler for the output document.
///
/// Pages are appended one at a time; `finalize` consumes the writer, so the
/// one-shot serialization contract is enforced by the type system.
pub struct PclmWriter {
    doc: Document,
    pages_id: lopdf::ObjectId,
    page_ids: Vec<lopdf::ObjectId>,
}

impl PclmWriter {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();
        PclmWriter {
            doc,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Create the page object with placeholder contents and an empty
    /// resource dictionary. Dimensions are converted from pixels to page
    /// units at the header's hardware resolution, rounded to integers.
    pub fn begin_page(&mut self, header: &PageHeader) -> OpenPage {
        let (xdpi, ydpi) = header.hw_resolution;
        let page_width = header.width as f64 / xdpi as f64 * PDF_UNIT;
        let page_height = header.height as f64 / ydpi as f64 * PDF_UNIT;

        let content_id = self.doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(self.pages_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer((page_width + 0.5) as i64),
                Object::Integer((page_height + 0.5) as i64),
            ],
            "Resources" => dictionary! {
                "XObject" => dictionary! {},
            },
            "Contents" => Object::Reference(content_id),
        });
        self.page_ids.push(page_id);

        OpenPage {
            page_id,
            content_id,
            pixel_width: header.width,
            pixel_height: header.height,
        }
    }

    /// Register the encoded strips as image resources and write the content
    /// program that places them, top to bottom.
    pub fn finish_page(
        &mut self,
        page: OpenPage,
        strips: Vec<EncodedStrip>,
        source_dpi: u32,
    ) -> crate::error::Result<()> {
        let content = build_content_program(&page, &strips, source_dpi);

        let count = strips.len();
        let mut xobjects = lopdf::Dictionary::new();
        for (i, strip) in strips.into_iter().enumerate() {
            let dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => strip.width as i64,
                "Height" => strip.height as i64,
                "ColorSpace" => pclm_color_space(strip.color_space)?,
                "BitsPerComponent" => strip.bits_per_color as i64,
                "Filter" => strip.method.filter_name(),
            };
            let strip_id = self
                .doc
                .add_object(Object::Stream(Stream::new(dict, strip.data)));
            xobjects.set(
                image_resource_name(i, count).into_bytes(),
                Object::Reference(strip_id),
            );
        }

        match self.doc.get_object_mut(page.page_id) {
            Ok(Object::Dictionary(dict)) => {
                dict.set(
                    "Resources",
                    dictionary! { "XObject" => Object::Dictionary(xobjects) },
                );
            }
            _ => {
                return Err(PclmError::document_write(format!(
                    "page object {:?} missing",
                    page.page_id
                )));
            }
        }
        self.doc.objects.insert(
            page.content_id,
            Object::Stream(Stream::new(dictionary! {}, content.into_bytes())),
        );

        Ok(())
    }

    /// Build the page tree and serialize the whole document.
    ///
    /// Consumes the writer: serialization happens exactly once, and the
    /// emitted bytes carry the restricted-profile marker on their second
    /// line.
    pub fn finalize(mut self) -> crate::error::Result<Vec<u8>> {
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(self.pages_id),
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| PclmError::document_write(e.to_string()))?;

        // Profile marker goes on the line after the version header.
        let after_header = bytes
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| p + 1)
            .unwrap_or(bytes.len());
        bytes.splice(after_header..after_header, *b"%PCLm 1.0\n");

        Ok(bytes)
    }
}

impl Default for PclmWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Image color space name for the restricted profile. Only one- and
/// three-channel output has a representation; CMYK pages cannot be emitted.
fn pclm_color_space(cs: ColorSpace) -> crate::error::Result<&'static str> {
    if cs.is_gray() {
        Ok("DeviceGray")
    } else if cs.is_rgb() {
        Ok("DeviceRGB")
    } else {
        Err(PclmError::document_write(format!(
            "color space {cs:?} not supported in output"
        )))
    }
}

/// Zero-padded resource name for strip `index` of `strip_count`. The pad
/// width is the digit count of the largest index, so the names sort
/// lexicographically in strip order for any strip count.
pub fn image_resource_name(index: usize, strip_count: usize) -> String {
    let width = num_digits(strip_count.saturating_sub(1));
    format!("Image{index:0width$}")
}

fn num_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        digits += 1;
        n /= 10;
    }
    digits
}

/// The fixed drawing program: one coordinate scale from source resolution
/// to page units, then a marked image placement per strip, anchored at the
/// strip's vertical offset from the page top.
fn build_content_program(page: &OpenPage, strips: &[EncodedStrip], source_dpi: u32) -> String {
    let scale = PDF_UNIT / source_dpi as f64;
    let mut content = format!("{scale} 0 0 {scale} 0 0 cm\n");
    let mut y_anchor = page.pixel_height;
    for (i, strip) in strips.iter().enumerate() {
        y_anchor -= strip.height;
        content.push_str("/P <</MCID 0>> BDC q\n");
        content.push_str(&format!(
            "{} 0 0 {} 0 {} cm\n",
            page.pixel_width, strip.height, y_anchor
        ));
        content.push_str(&format!(
            "/{} Do Q\n",
            image_resource_name(i, strips.len())
        ));
    }
    content
}
