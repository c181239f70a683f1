//! 分页查询参数

use serde::Deserialize;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// `?page=&limit=` 原始参数；无法解析的值回退为默认值
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// 已解析的分页窗口，按 id 升序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// 不分页
    pub fn all() -> Self {
        Self {
            limit: i64::MAX,
            offset: 0,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl From<PageQuery> for Page {
    fn from(query: PageQuery) -> Self {
        let page = query
            .page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let limit = query
            .limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .map(|l| l.min(MAX_PAGE_LIMIT))
            .unwrap_or(DEFAULT_PAGE_LIMIT);

        Self {
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }
}
