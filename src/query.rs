//! List query state: paging, sorting and search parsed from request parameters.

use crate::blueprint::encode_query;
use std::collections::HashSet;
use std::sync::Arc;

pub const PARAM_PAGE: &str = "page";
pub const PARAM_PAGE_SIZE: &str = "page_size";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_DESC: &str = "desc";
pub const PARAM_SEARCH: &str = "search";

/// Per-view settings a query is parsed against. Built once per model view.
#[derive(Clone, Debug)]
pub struct QueryOptions {
    /// Visible column storage names, in display order. `sort` indexes into this list.
    pub columns: Vec<String>,
    pub sortable: HashSet<String>,
    pub searchable: Vec<String>,
    pub page_size: u32,
    pub can_set_page_size: bool,
    pub max_page_size: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            columns: Vec::new(),
            sortable: HashSet::new(),
            searchable: Vec::new(),
            page_size: 20,
            can_set_page_size: false,
            max_page_size: 500,
        }
    }
}

/// Number of pages for `total` rows: at least one page, even when empty.
pub fn num_pages(total: u64, page_size: u32) -> u32 {
    if total == 0 || page_size == 0 {
        return 1;
    }
    let pages = 1 + (total - 1) / u64::from(page_size);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[derive(Clone, Debug)]
pub struct Query {
    /// Zero-based page index. The wire parameter is one-based.
    pub page: u32,
    /// Client page size; 0 means the view default.
    pub page_size: u32,
    pub sort_column: Option<String>,
    pub sort_desc: bool,
    pub search: Option<String>,
    pub total: u64,
    pub num_pages: u32,
    /// Unrecognized parameters, carried into every generated link.
    pub args: Vec<(String, String)>,
    options: Arc<QueryOptions>,
}

impl Query {
    pub fn new(options: Arc<QueryOptions>) -> Self {
        Query {
            page: 0,
            page_size: 0,
            sort_column: None,
            sort_desc: false,
            search: None,
            total: 0,
            num_pages: 1,
            args: Vec::new(),
            options,
        }
    }

    /// Parse request parameters. Malformed numbers are ignored (default kept).
    pub fn from_request(params: &[(String, String)], options: Arc<QueryOptions>) -> Self {
        let mut q = Query::new(options);
        for (k, v) in params {
            match k.as_str() {
                PARAM_PAGE => {
                    if let Some(n) = parse_param::<u32>(k, v) {
                        q.page = n.saturating_sub(1);
                    }
                }
                PARAM_PAGE_SIZE => {
                    if q.options.can_set_page_size {
                        if let Some(n) = parse_param::<u32>(k, v) {
                            q.page_size = n.min(q.options.max_page_size);
                        }
                    }
                }
                PARAM_SORT => {
                    q.sort_column = parse_param::<usize>(k, v)
                        .and_then(|i| q.options.columns.get(i))
                        .filter(|c| q.options.sortable.contains(c.as_str()))
                        .cloned();
                }
                PARAM_DESC => {
                    q.sort_desc = !matches!(v.trim(), "0" | "false");
                }
                PARAM_SEARCH => {
                    let s = v.trim();
                    q.search = if s.is_empty() { None } else { Some(s.to_string()) };
                }
                _ => q.args.push((k.clone(), v.clone())),
            }
        }
        q
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Page size actually used for fetching.
    pub fn effective_page_size(&self) -> u32 {
        if self.page_size > 0 {
            self.page_size
        } else {
            self.options.page_size.max(1)
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.effective_page_size())
    }

    /// Record the total row count and derive the page count.
    pub fn set_total(&mut self, total: u64) {
        self.total = total;
        self.num_pages = num_pages(total, self.effective_page_size());
    }

    /// Copy with only the sort replaced.
    pub fn with_sort(&self, column: impl Into<String>, desc: bool) -> Self {
        Query {
            sort_column: Some(column.into()),
            sort_desc: desc,
            ..self.clone()
        }
    }

    pub fn with_page(&self, page: u32) -> Self {
        Query { page, ..self.clone() }
    }

    pub fn with_page_size(&self, page_size: u32) -> Self {
        Query {
            page_size: page_size.min(self.options.max_page_size),
            ..self.clone()
        }
    }

    pub fn with_search(&self, search: Option<String>) -> Self {
        Query {
            search: search.filter(|s| !s.is_empty()),
            page: 0,
            ..self.clone()
        }
    }

    /// Non-default fields as request parameters. Booleans are "1"/"0"; zero and empty values are omitted.
    pub fn to_args(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if self.page > 0 {
            out.push((PARAM_PAGE.to_string(), (u64::from(self.page) + 1).to_string()));
        }
        if self.page_size > 0 && self.page_size != self.options.page_size {
            out.push((PARAM_PAGE_SIZE.to_string(), self.page_size.to_string()));
        }
        let sort_index = self
            .sort_column
            .as_deref()
            .and_then(|c| self.options.columns.iter().position(|x| x == c));
        if let Some(i) = sort_index {
            out.push((PARAM_SORT.to_string(), i.to_string()));
            if self.sort_desc {
                out.push((PARAM_DESC.to_string(), bool_flag(true).to_string()));
            }
        }
        if let Some(s) = self.search.as_deref().filter(|s| !s.is_empty()) {
            out.push((PARAM_SEARCH.to_string(), s.to_string()));
        }
        out.extend(self.args.iter().cloned());
        out
    }

    pub fn to_query_string(&self) -> String {
        encode_query(&self.to_args())
    }
}

fn bool_flag(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

fn parse_param<T: std::str::FromStr>(name: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::debug!(param = %name, value = %value, "malformed query parameter, using default");
            None
        }
    }
}
