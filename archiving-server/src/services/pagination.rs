use serde::Serialize;

/// 每页归档条数
pub const PAGE_SIZE: u32 = 5;

/// 1-based page of the archive history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
}

impl PageRequest {
    pub fn new(page: u32) -> Self {
        Self { page: page.max(1) }
    }

    /// Absent, non-numeric and zero values all mean the first page.
    pub fn parse(raw: Option<&str>) -> Self {
        let page = raw
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(1);
        Self::new(page)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(PAGE_SIZE)
    }

    pub fn limit(&self) -> u32 {
        PAGE_SIZE
    }

    pub fn links(&self, total: u32) -> PageLinks {
        let previous = (self.page > 1).then(|| page_link(self.page - 1));
        let next = (u64::from(total) > u64::from(self.offset()) + u64::from(PAGE_SIZE))
            .then(|| page_link(self.page.saturating_add(1)));
        PageLinks { previous, next }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub previous: Option<String>,
    pub next: Option<String>,
}

fn page_link(page: u32) -> String {
    format!("past-archives?page={}", page)
}
