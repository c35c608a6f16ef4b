#![allow(dead_code)]

//! Byte-level builders for CIFF/CAFF fixtures.

/// CIFF image description; `header_size` is computed unless overridden.
#[derive(Clone, Debug)]
pub struct CiffSpec {
    pub width: u64,
    pub height: u64,
    pub content_size: Option<u64>,
    pub header_size: Option<u64>,
    pub caption: Vec<u8>,
    pub tags: Vec<Vec<u8>>,
    pub pixels: Vec<u8>,
}

impl CiffSpec {
    pub fn solid(width: u64, height: u64, rgb: [u8; 3], caption: &str) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Self {
            width,
            height,
            content_size: None,
            header_size: None,
            caption: caption.as_bytes().to_vec(),
            tags: Vec::new(),
            pixels,
        }
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.as_bytes().to_vec());
        self
    }

    /// Header length the layout actually occupies.
    pub fn natural_header_size(&self) -> u64 {
        let text: usize =
            self.caption.len() + 1 + self.tags.iter().map(|t| t.len() + 1).sum::<usize>();
        ciffcaff::CIFF_FIXED_HEADER_LEN + text as u64
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let header_size = self
            .header_size
            .unwrap_or_else(|| self.natural_header_size());
        let content_size = self
            .content_size
            .unwrap_or_else(|| self.width * self.height * 3);

        let mut out = Vec::new();
        out.extend_from_slice(b"CIFF");
        out.extend_from_slice(&header_size.to_le_bytes());
        out.extend_from_slice(&content_size.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.caption);
        out.push(b'\n');
        for tag in &self.tags {
            out.extend_from_slice(tag);
            out.push(0);
        }
        out.extend_from_slice(&self.pixels);
        out
    }
}

pub fn block(id: u8, declared: u64, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![id];
    out.extend_from_slice(&declared.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn header_payload(animation_count: u64) -> Vec<u8> {
    let mut p = b"CAFF".to_vec();
    p.extend_from_slice(&20u64.to_le_bytes());
    p.extend_from_slice(&animation_count.to_le_bytes());
    p
}

pub fn header_block(animation_count: u64) -> Vec<u8> {
    let p = header_payload(animation_count);
    block(1, p.len() as u64, &p)
}

#[derive(Clone, Copy, Debug)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl Default for Date {
    fn default() -> Self {
        Self {
            year: 2020,
            month: 7,
            day: 2,
            hour: 14,
            minute: 50,
        }
    }
}

pub fn credits_payload(date: Date, creator: &str) -> Vec<u8> {
    let mut p = date.year.to_le_bytes().to_vec();
    p.extend_from_slice(&[date.month, date.day, date.hour, date.minute]);
    p.extend_from_slice(&(creator.len() as u64).to_le_bytes());
    p.extend_from_slice(creator.as_bytes());
    p
}

pub fn credits_block(date: Date, creator: &str) -> Vec<u8> {
    let p = credits_payload(date, creator);
    block(2, p.len() as u64, &p)
}

pub fn animation_payload(duration_ms: u64, ciff: &CiffSpec) -> Vec<u8> {
    let mut p = duration_ms.to_le_bytes().to_vec();
    p.extend_from_slice(&ciff.to_bytes());
    p
}

pub fn animation_block(duration_ms: u64, ciff: &CiffSpec) -> Vec<u8> {
    let p = animation_payload(duration_ms, ciff);
    block(3, p.len() as u64, &p)
}

pub fn concat(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.concat()
}
