//! Minimal PDF 1.4 writer using the built-in Helvetica fonts, so no font
//! files are needed. Text only; lines flow onto new pages as needed.

const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;
const MARGIN: f64 = 50.0;
const LINE_HEIGHT_FACTOR: f64 = 1.4;

pub const LEFT: f64 = MARGIN;

struct TextRun {
    x: f64,
    y: f64,
    size: f64,
    bold: bool,
    text: String,
}

pub struct PdfWriter {
    pages: Vec<Vec<TextRun>>,
    y: f64,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Moves the cursor down one line of `size`, breaking the page first if
    /// the line would cross the bottom margin.
    fn advance(&mut self, size: f64) -> f64 {
        let step = size * LINE_HEIGHT_FACTOR;
        if self.y - step < MARGIN {
            self.pages.push(Vec::new());
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= step;
        self.y
    }

    pub fn line(&mut self, text: &str, size: f64, bold: bool) {
        self.row(&[(LEFT, text)], size, bold);
    }

    /// One line with several cells at absolute x offsets.
    pub fn row(&mut self, cells: &[(f64, &str)], size: f64, bold: bool) {
        let y = self.advance(size);
        if let Some(page) = self.pages.last_mut() {
            for (x, text) in cells {
                if text.is_empty() {
                    continue;
                }
                page.push(TextRun {
                    x: *x,
                    y,
                    size,
                    bold,
                    text: escape(text),
                });
            }
        }
    }

    pub fn blank(&mut self, size: f64) {
        self.advance(size);
    }

    pub fn finish(self) -> Vec<u8> {
        // 1 catalog, 2 pages, 3-4 fonts, then a page + content pair per page.
        let page_ids: Vec<usize> = (0..self.pages.len()).map(|i| 5 + 2 * i).collect();
        let mut buf = Vec::new();
        let mut offsets = Vec::new();

        emit(&mut buf, "%PDF-1.4\n");
        buf.extend_from_slice(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n']);

        offsets.push(buf.len());
        emit(&mut buf, "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        offsets.push(buf.len());
        let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();
        emit(
            &mut buf,
            &format!(
                "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
                kids.join(" "),
                page_ids.len()
            ),
        );

        offsets.push(buf.len());
        emit(&mut buf, "3 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n");
        offsets.push(buf.len());
        emit(&mut buf, "4 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>\nendobj\n");

        for (runs, page_id) in self.pages.iter().zip(&page_ids) {
            let content_id = page_id + 1;
            let mut stream = String::from("BT\n");
            for run in runs {
                let font = if run.bold { "/F2" } else { "/F1" };
                stream.push_str(&format!(
                    "{font} {} Tf\n1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\n",
                    run.size, run.x, run.y, run.text
                ));
            }
            stream.push_str("ET\n");

            offsets.push(buf.len());
            emit(
                &mut buf,
                &format!(
                    "{page_id} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] /Contents {content_id} 0 R /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> >>\nendobj\n"
                ),
            );
            offsets.push(buf.len());
            emit(
                &mut buf,
                &format!(
                    "{content_id} 0 obj\n<< /Length {} >>\nstream\n{stream}\nendstream\nendobj\n",
                    stream.len()
                ),
            );
        }

        let xref_start = buf.len();
        emit(&mut buf, &format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1));
        for offset in &offsets {
            emit(&mut buf, &format!("{offset:010} 00000 n \n"));
        }
        emit(
            &mut buf,
            &format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
                offsets.len() + 1
            ),
        );
        buf
    }
}

fn emit(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
}

/// Escapes PDF string delimiters. Non-ASCII is dropped since the base fonts
/// only cover WinAnsi.
fn escape(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .fold(String::with_capacity(s.len()), |mut out, c| {
            if matches!(c, '\\' | '(' | ')') {
                out.push('\\');
            }
            out.push(c);
            out
        })
}
