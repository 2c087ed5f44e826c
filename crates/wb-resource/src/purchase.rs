use serde::{Deserialize, Serialize};
use wb_core::{Noneable, SingleVec, Usd};

/// One place a part can be bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub url: String,
    #[serde(rename = "price")]
    pub cost: Usd,
}

impl PurchaseItem {
    pub fn new(url: impl Into<String>, cost: Usd) -> Self {
        Self {
            url: url.into(),
            cost,
        }
    }
}

/// Purchase options for a resource, serialized as a JSON array of
/// `{"price": "$d.cc", "url": "..."}`.
///
/// An empty list is the absent state, so `Optional<PurchaseData>` costs no
/// more than the list itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseData {
    items: SingleVec<PurchaseItem>,
}

impl PurchaseData {
    pub fn new(first: PurchaseItem) -> Self {
        Self {
            items: SingleVec::new(first),
        }
    }

    pub fn push(&mut self, item: PurchaseItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PurchaseItem> {
        self.items.iter()
    }

    /// Lowest listed price.
    pub fn cheapest(&self) -> Option<&PurchaseItem> {
        self.iter().min_by_key(|item| item.cost)
    }
}

impl<'a> IntoIterator for &'a PurchaseData {
    type Item = &'a PurchaseItem;
    type IntoIter = std::slice::Iter<'a, PurchaseItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Noneable for PurchaseData {
    fn none() -> Self {
        Self {
            items: SingleVec::none(),
        }
    }

    fn is_none(&self) -> bool {
        self.items.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wb_core::Optional;

    #[test]
    fn parses_price_list() {
        let data: PurchaseData = serde_json::from_str(
            r#"[{"price": "$5.99", "url": "https://a"}, {"price": "40c", "url": "https://b"}]"#,
        )
        .unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.cheapest().map(|i| i.url.as_str()), Some("https://b"));
        assert_eq!(
            serde_json::to_string(&data).unwrap(),
            r#"[{"url":"https://a","price":"$5.99"},{"url":"https://b","price":"$0.40"}]"#
        );
    }

    #[test]
    fn optional_purchase_data() {
        assert_eq!(
            std::mem::size_of::<Optional<PurchaseData>>(),
            std::mem::size_of::<PurchaseData>()
        );
        let missing: Optional<PurchaseData> = serde_json::from_str("null").unwrap();
        assert!(missing.is_none());
        let empty: Optional<PurchaseData> = serde_json::from_str("[]").unwrap();
        assert!(empty.is_none());
        assert_eq!(empty.iter().count(), 0);
    }

    #[test]
    fn bad_price_is_rejected() {
        let err = serde_json::from_str::<PurchaseData>(r#"[{"price": "$40c", "url": "x"}]"#)
            .unwrap_err();
        assert!(err.to_string().contains("$40c"));
    }
}
