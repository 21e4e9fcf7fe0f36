use serde::{Deserialize, Serialize};

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    10
}

// Query-string values reach flattened structs as strings, so the fields must
// accept both representations.
fn de_page_param<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct PageVisitor;

    impl serde::de::Visitor<'_> for PageVisitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("an integer")
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<i64, E> {
            Ok(v as i64)
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<i64, E> {
            v.parse().map_err(serde::de::Error::custom)
        }
    }

    deserializer.deserialize_any(PageVisitor)
}

/// Common `page`/`per_page` query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page", deserialize_with = "de_page_param")]
    pub page: i64,
    #[serde(default = "default_per_page", deserialize_with = "de_page_param")]
    pub per_page: i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, per_page: 10 }
    }
}

impl PageQuery {
    pub fn normalized(&self) -> (i64, i64) {
        let per_page = self.per_page.clamp(1, 100);
        let page = self.page.max(1);
        (page, per_page)
    }

    pub fn offset(&self) -> i64 {
        let (page, per_page) = self.normalized();
        (page - 1) * per_page
    }
}

/// One page of results with embedded pagination metadata.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, page: i64, per_page: i64) -> Self {
        let last_page = if total == 0 { 1 } else { (total + per_page - 1) / per_page };
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = (page - 1) * per_page + 1;
            (Some(from), Some(from + data.len() as i64 - 1))
        };

        Self {
            data,
            current_page: page,
            last_page,
            per_page,
            total,
            from,
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_for_a_middle_page() {
        let page = Paginated::new(vec![1, 2, 3], 23, 2, 10);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.total, 23);
        assert_eq!(page.from, Some(11));
        assert_eq!(page.to, Some(13));
    }

    #[test]
    fn empty_page_has_no_bounds() {
        let page: Paginated<i32> = Paginated::new(vec![], 0, 1, 10);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.from, None);
        assert_eq!(page.to, None);
    }

    #[test]
    fn page_params_accept_string_values() {
        let query: PageQuery =
            serde_json::from_value(serde_json::json!({"page": "2", "per_page": "50"})).unwrap();
        assert_eq!(query.page, 2);
        assert_eq!(query.per_page, 50);
    }

    #[test]
    fn query_normalization_clamps_inputs() {
        let query = PageQuery { page: 0, per_page: 1000 };
        assert_eq!(query.normalized(), (1, 100));
        assert_eq!(query.offset(), 0);

        let query = PageQuery { page: 3, per_page: 10 };
        assert_eq!(query.offset(), 20);
    }
}
