//! Column definitions for the admin tables.
//!
//! Each entity maps to an ordered list of `(key, header)` pairs plus a
//! trailing `actions` column, and to a flat row type with display-ready
//! strings.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::models::{Billboard, CategoryDetail, Color, ProductDetail, Size, Store};
use crate::schema::Resource;

pub const ACTIONS_KEY: &str = "actions";

/// Column definition for a data table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Row field the column reads.
    pub key: String,
    /// Display label for the column header.
    pub header: String,
}

impl TableColumn {
    #[must_use]
    pub fn new(key: &str, header: &str) -> Self {
        Self {
            key: key.to_string(),
            header: header.to_string(),
        }
    }

    /// The synthetic per-row controls column.
    #[must_use]
    pub fn actions() -> Self {
        Self::new(ACTIONS_KEY, "")
    }

    pub fn is_actions(&self) -> bool {
        self.key == ACTIONS_KEY
    }
}

/// Ordered columns for a resource table, actions last.
pub fn columns(resource: Resource) -> Vec<TableColumn> {
    let mut cols = match resource {
        Resource::Stores => vec![TableColumn::new("name", "Name"), TableColumn::new("createdAt", "Date")],
        Resource::Billboards => vec![TableColumn::new("label", "Label"), TableColumn::new("createdAt", "Date")],
        Resource::Categories => vec![
            TableColumn::new("name", "Name"),
            TableColumn::new("billboardLabel", "Billboard"),
            TableColumn::new("createdAt", "Date"),
        ],
        Resource::Sizes | Resource::Colors => vec![
            TableColumn::new("name", "Name"),
            TableColumn::new("value", "Value"),
            TableColumn::new("createdAt", "Date"),
        ],
        Resource::Products => vec![
            TableColumn::new("name", "Name"),
            TableColumn::new("isArchived", "Archived"),
            TableColumn::new("isFeatured", "Featured"),
            TableColumn::new("price", "Price"),
            TableColumn::new("category", "Category"),
            TableColumn::new("size", "Size"),
            TableColumn::new("color", "Color"),
            TableColumn::new("createdAt", "Date"),
        ],
    };
    cols.push(TableColumn::actions());
    cols
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreColumn {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillboardColumn {
    pub id: String,
    pub label: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryColumn {
    pub id: String,
    pub name: String,
    pub billboard_label: String,
    pub created_at: String,
}

/// Row for sizes and colors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwatchColumn {
    pub id: String,
    pub name: String,
    pub value: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColumn {
    pub id: String,
    pub name: String,
    pub is_featured: bool,
    pub is_archived: bool,
    pub price: String,
    pub category: String,
    pub size: String,
    pub color: String,
    pub created_at: String,
}

impl From<&Store> for StoreColumn {
    fn from(s: &Store) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            created_at: format_date(&s.created_at),
        }
    }
}

impl From<&Billboard> for BillboardColumn {
    fn from(b: &Billboard) -> Self {
        Self {
            id: b.id.clone(),
            label: b.label.clone(),
            created_at: format_date(&b.created_at),
        }
    }
}

impl From<&CategoryDetail> for CategoryColumn {
    fn from(c: &CategoryDetail) -> Self {
        Self {
            id: c.category.id.clone(),
            name: c.category.name.clone(),
            billboard_label: c.billboard.as_ref().map(|b| b.label.clone()).unwrap_or_default(),
            created_at: format_date(&c.category.created_at),
        }
    }
}

impl From<&Size> for SwatchColumn {
    fn from(s: &Size) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            value: s.value.clone(),
            created_at: format_date(&s.created_at),
        }
    }
}

impl From<&Color> for SwatchColumn {
    fn from(c: &Color) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            value: c.value.clone(),
            created_at: format_date(&c.created_at),
        }
    }
}

impl From<&ProductDetail> for ProductColumn {
    fn from(p: &ProductDetail) -> Self {
        Self {
            id: p.product.id.clone(),
            name: p.product.name.clone(),
            is_featured: p.product.is_featured,
            is_archived: p.product.is_archived,
            price: format_price(p.product.price),
            category: p.category.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
            size: p.size.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            color: p.color.as_ref().map(|c| c.value.clone()).unwrap_or_default(),
            created_at: format_date(&p.product.created_at),
        }
    }
}

/// Convert an API listing into table rows keyed by column.
pub fn rows(resource: Resource, listing: Value) -> Result<Vec<Value>, serde_json::Error> {
    fn to_rows<T, R>(listing: Value) -> Result<Vec<Value>, serde_json::Error>
    where
        T: for<'de> Deserialize<'de>,
        R: for<'a> From<&'a T> + Serialize,
    {
        let items: Vec<T> = serde_json::from_value(listing)?;
        items.iter().map(|item| serde_json::to_value(R::from(item))).collect()
    }

    match resource {
        Resource::Stores => to_rows::<Store, StoreColumn>(listing),
        Resource::Billboards => to_rows::<Billboard, BillboardColumn>(listing),
        Resource::Categories => to_rows::<CategoryDetail, CategoryColumn>(listing),
        Resource::Sizes => to_rows::<Size, SwatchColumn>(listing),
        Resource::Colors => to_rows::<Color, SwatchColumn>(listing),
        Resource::Products => to_rows::<ProductDetail, ProductColumn>(listing),
    }
}

/// Controls rendered in the actions cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellAction {
    /// Copy the record id; `notice` is shown afterwards.
    CopyId { id: String, notice: String },
    /// Navigate to the edit page.
    Update { path: String },
    /// Open the delete confirmation for this record.
    Delete { id: String },
}

pub fn cell_actions(store_id: &str, resource: Resource, id: &str) -> Vec<CellAction> {
    vec![
        CellAction::CopyId {
            id: id.to_string(),
            notice: format!("{} ID copied to clipboard.", resource.singular()),
        },
        CellAction::Update {
            path: format!("/{}/{}/{}", store_id, resource.segment(), id),
        },
        CellAction::Delete { id: id.to_string() },
    ]
}

/// "July 4th, 2023"
pub fn format_date(date: &DateTime<Utc>) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {}{}, {}", date.format("%B"), day, suffix, date.year())
}

/// US dollars with thousands grouping: "$1,299.00"
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn dates_use_ordinal_days() {
        let at = |d| Utc.with_ymd_and_hms(2023, 7, d, 12, 0, 0).unwrap();
        assert_eq!(format_date(&at(4)), "July 4th, 2023");
        assert_eq!(format_date(&at(1)), "July 1st, 2023");
        assert_eq!(format_date(&at(22)), "July 22nd, 2023");
        assert_eq!(format_date(&at(13)), "July 13th, 2023");
        assert_eq!(format_date(&at(23)), "July 23rd, 2023");
    }

    #[test]
    fn prices_are_grouped_usd() {
        assert_eq!(format_price(Decimal::new(129900, 2)), "$1,299.00");
        assert_eq!(format_price(Decimal::new(5, 1)), "$0.50");
        assert_eq!(format_price(Decimal::new(123456789, 0)), "$123,456,789.00");
        assert_eq!(format_price(Decimal::new(-2500, 2)), "-$25.00");
    }

    #[test]
    fn every_table_ends_with_actions() {
        for resource in Resource::ALL {
            let cols = columns(resource);
            assert!(cols.last().unwrap().is_actions());
        }
        let headers: Vec<_> = columns(Resource::Billboards).into_iter().map(|c| c.header).collect();
        assert_eq!(headers, vec!["Label", "Date", ""]);
    }

    #[test]
    fn billboard_listing_becomes_rows() {
        let listing = json!([{
            "id": "b1", "storeId": "s1", "label": "Sale", "imageUrl": "https://x/y.png",
            "createdAt": "2023-07-04T10:00:00Z", "updatedAt": "2023-07-04T10:00:00Z"
        }]);
        let rows = rows(Resource::Billboards, listing).unwrap();
        assert_eq!(rows[0], json!({ "id": "b1", "label": "Sale", "createdAt": "July 4th, 2023" }));
    }

    #[test]
    fn cell_actions_point_at_edit_page() {
        let actions = cell_actions("s1", Resource::Sizes, "z9");
        assert_eq!(actions[1], CellAction::Update { path: "/s1/sizes/z9".to_string() });
        assert_eq!(
            actions[0],
            CellAction::CopyId { id: "z9".to_string(), notice: "Size ID copied to clipboard.".to_string() }
        );
    }
}
