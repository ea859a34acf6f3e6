//! Row range queries.

use std::collections::BTreeMap;

use url::Url;

use crate::config::RemoteModelConfig;

/// One request for the rows `[from, to)` under the current sort and filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    pub from: usize,
    pub to: usize,
    pub sort_col: Option<String>,
    pub sort_dir: bool,
    pub extra: BTreeMap<String, String>,
}

impl RangeQuery {
    /// Query for `[from, to)` with the sort and filter of `config`.
    pub fn new(from: usize, to: usize, config: &RemoteModelConfig) -> Self {
        Self {
            from,
            to,
            sort_col: config.sort_col.clone(),
            sort_dir: config.sort_dir,
            extra: config.extra_query.clone(),
        }
    }

    /// Number of rows asked for.
    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Query parameters in request order.
    ///
    /// Extra parameters win over the range and sort parameters of the same
    /// name.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("from".to_string(), self.from.to_string()),
            ("to".to_string(), self.to.to_string()),
        ];
        if let Some(sort_col) = &self.sort_col {
            pairs.push(("sortCol".to_string(), sort_col.clone()));
        }
        pairs.push(("sortDir".to_string(), self.sort_dir.to_string()));
        pairs.retain(|(key, _)| !self.extra.contains_key(key));
        pairs.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }

    /// `base` with the query parameters appended.
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in self.pairs() {
                query.append_pair(&key, &value);
            }
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RemoteModelConfig {
        RemoteModelConfig::new("http://cms.example/folder/@@contents.json").with_sort_col("name")
    }

    #[test]
    fn test_pairs_in_request_order() {
        let query = RangeQuery::new(100, 300, &config().with_extra_query("filter", "doc"));
        let keys: Vec<String> = query.pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["from", "to", "sortCol", "sortDir", "filter"]);
    }

    #[test]
    fn test_missing_sort_col_is_omitted() {
        let query = RangeQuery::new(0, 10, &RemoteModelConfig::new("/c"));
        assert!(query.pairs().iter().all(|(k, _)| k != "sortCol"));
    }

    #[test]
    fn test_extra_parameter_overrides_builtin() {
        let query = RangeQuery::new(0, 10, &config().with_extra_query("sortDir", "desc"));
        let sort_dirs: Vec<String> = query
            .pairs()
            .into_iter()
            .filter(|(k, _)| k == "sortDir")
            .map(|(_, v)| v)
            .collect();
        assert_eq!(sort_dirs, vec!["desc"]);
    }

    #[test]
    fn test_to_url_encodes_values() {
        let base = Url::parse("http://cms.example/folder/@@contents.json").unwrap();
        let query = RangeQuery::new(0, 50, &config().with_extra_query("filter", "a b&c"));
        let url = query.to_url(&base);
        assert_eq!(
            url.as_str(),
            "http://cms.example/folder/@@contents.json?from=0&to=50&sortCol=name&sortDir=true&filter=a+b%26c"
        );
    }
}
