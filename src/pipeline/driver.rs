use tracing::{info, warn};

use crate::color::policy::{ColorPolicy, ProfileSignature};
use crate::config::DeviceProfile;
use crate::pclm::encoder::{self, CompressionMethod};
use crate::pclm::strip::{PageStrips, StripPlan};
use crate::pclm::writer::{OpenPage, PclmWriter};
use crate::raster::{PageHeader, RasterSource};

/// Run-wide settings, fixed at startup and never mutated during the page
/// loop (the color profile is the one exception: an unusable signature
/// disables it for the remainder of the run).
pub struct RunConfig {
    pub device: DeviceProfile,
    pub profile: Option<ProfileSignature>,
}

/// What a completed run produced. `document` is `None` when the stream
/// carried no pages; no bytes are emitted in that case.
pub struct RunSummary {
    pub pages: u32,
    pub document: Option<Vec<u8>>,
}

/// A page between open and close: descriptor, policy and strip buffers.
/// Closing is triggered by the next page open or by end of stream.
struct PageInProgress {
    header: PageHeader,
    policy: ColorPolicy,
    strips: PageStrips,
    open_page: OpenPage,
}

/// Convert every page of the raster stream into the output document.
///
/// Pages are processed strictly sequentially: open, ingest rows in order,
/// close on the next page boundary. Finalization runs exactly once, after
/// the last page.
pub fn run<S: RasterSource>(
    source: &mut S,
    config: &RunConfig,
) -> crate::error::Result<RunSummary> {
    let strip_height = config.device.effective_strip_height();
    let method = CompressionMethod::select(&config.device.compression_methods());
    let source_dpi = config.device.default_source_resolution();
    let mut profile = config.profile;

    let mut writer = PclmWriter::new();
    let mut open: Option<PageInProgress> = None;
    let mut pages: u32 = 0;

    while let Some(header) = source.next_page()? {
        if let Some(previous) = open.take() {
            close_page(&mut writer, previous, method, source_dpi)?;
        }

        pages += 1;
        info!(page = pages, width = header.width, height = header.height, "starting page");

        let resolved = ColorPolicy::resolve(&header, profile);
        if resolved.color_management_disabled {
            profile = None;
        }
        let policy = resolved.policy;

        let line_bytes = policy.line_bytes(header.width);
        let plan = StripPlan::new(header.height, strip_height);
        let mut strips = PageStrips::allocate(&plan, line_bytes)?;
        let open_page = writer.begin_page(&header);

        ingest_rows(source, &header, &policy, &mut strips)?;

        open = Some(PageInProgress {
            header,
            policy,
            strips,
            open_page,
        });
    }

    if let Some(previous) = open.take() {
        close_page(&mut writer, previous, method, source_dpi)?;
    }

    if pages == 0 {
        warn!("raster stream contained no pages, nothing to write");
        return Ok(RunSummary {
            pages: 0,
            document: None,
        });
    }

    let document = writer.finalize()?;
    Ok(RunSummary {
        pages,
        document: Some(document),
    })
}

/// Stream every row of the page through byte-order correction, bit
/// polarity and color conversion into its owning strip buffer.
fn ingest_rows<S: RasterSource>(
    source: &mut S,
    header: &PageHeader,
    policy: &ColorPolicy,
    strips: &mut PageStrips,
) -> crate::error::Result<()> {
    let mut raw = vec![0u8; header.bytes_per_line as usize];
    let mut scratch = Vec::new();

    for row in 0..header.height {
        source.read_row(&mut raw)?;

        // The transport delivers 16-bit samples big-endian.
        if header.bits_per_color == 16 && cfg!(target_endian = "little") {
            for pair in raw.chunks_exact_mut(2) {
                pair.swap(0, 1);
            }
        }

        policy.bits.apply(&mut raw);
        let converted = policy.convert.apply(&raw, &mut scratch, header.width as usize);
        strips.write_row(row, converted);
    }

    Ok(())
}

/// Encode the page's strips and hand them to the assembler. Runs exactly
/// once per page.
fn close_page(
    writer: &mut PclmWriter,
    page: PageInProgress,
    method: CompressionMethod,
    source_dpi: u32,
) -> crate::error::Result<()> {
    let encoded = encoder::encode_strips(
        page.strips.into_strips(),
        method,
        page.header.width,
        &page.policy,
    )?;
    writer.finish_page(page.open_page, encoded, source_dpi)
}
