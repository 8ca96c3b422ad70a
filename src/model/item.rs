//! Catalogue items: untimestamped records with a price.

use super::{Patch, Resource};
use crate::error::AppError;
use crate::service::validation::{
    check_length, check_non_negative, check_optional_length, check_positive,
};
use crate::service::ValidationErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub tax: Option<f64>,
}

/// Validated fields for a new item.
#[derive(Clone, Debug, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub tax: Option<f64>,
}

/// Validated merge update for an item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Patch<String>,
    pub description: Patch<Option<String>>,
    pub price: Patch<f64>,
    pub tax: Patch<Option<f64>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ItemFilter {
    Name(String),
}

/// Item creation payload as received.
#[derive(Clone, Debug, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub tax: Option<f64>,
}

/// Item update payload as received.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ItemChanges {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default)]
    pub price: Patch<f64>,
    #[serde(default)]
    pub tax: Patch<Option<f64>>,
}

impl ItemDraft {
    pub fn validate(self) -> Result<NewItem, AppError> {
        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "name", &self.name, 1, NAME_MAX);
        let description = self.description.as_deref();
        check_optional_length(&mut errors, "description", description, DESCRIPTION_MAX);
        check_positive(&mut errors, "price", self.price);
        if let Some(tax) = self.tax {
            check_non_negative(&mut errors, "tax", tax);
        }
        errors.finish(NewItem {
            name: self.name,
            description: self.description,
            price: self.price,
            tax: self.tax,
        })
    }
}

impl ItemChanges {
    pub fn validate(self) -> Result<ItemPatch, AppError> {
        let mut errors = ValidationErrors::new();
        if let Patch::Set(name) = &self.name {
            check_length(&mut errors, "name", name, 1, NAME_MAX);
        }
        if let Patch::Set(description) = &self.description {
            let description = description.as_deref();
            check_optional_length(&mut errors, "description", description, DESCRIPTION_MAX);
        }
        if let Patch::Set(price) = self.price {
            check_positive(&mut errors, "price", price);
        }
        if let Patch::Set(Some(tax)) = self.tax {
            check_non_negative(&mut errors, "tax", tax);
        }
        errors.finish(ItemPatch {
            name: self.name,
            description: self.description,
            price: self.price,
            tax: self.tax,
        })
    }
}

impl Resource for Item {
    const KIND: &'static str = "Item";
    const DEFAULT_LIMIT: Option<usize> = Some(10);

    type Create = NewItem;
    type Patch = ItemPatch;
    type Filter = ItemFilter;

    fn id(&self) -> i64 {
        self.id
    }

    fn build(id: i64, fields: NewItem, _now: DateTime<Utc>) -> Self {
        Item {
            id,
            name: fields.name,
            description: fields.description,
            price: fields.price,
            tax: fields.tax,
        }
    }

    fn apply_patch(&mut self, patch: ItemPatch, _now: DateTime<Utc>) {
        patch.name.apply_to(&mut self.name);
        patch.description.apply_to(&mut self.description);
        patch.price.apply_to(&mut self.price);
        patch.tax.apply_to(&mut self.tax);
    }

    fn matches(&self, filter: &ItemFilter) -> bool {
        match filter {
            ItemFilter::Name(name) => &self.name == name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(json: &str) -> ItemDraft {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn valid_draft_passes_through() {
        let item = draft(r#"{"name": "Test Item", "price": 10.5}"#).validate().unwrap();
        assert_eq!(item.name, "Test Item");
        assert_eq!(item.price, 10.5);
        assert_eq!(item.description, None);
        assert_eq!(item.tax, None);
    }

    #[test]
    fn draft_collects_every_violation() {
        let err = draft(r#"{"name": "", "price": 0, "tax": -1}"#).validate().unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert!(errors.has("name"));
                assert!(errors.has("price"));
                assert!(errors.has("tax"));
                assert!(!errors.has("description"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_price_is_a_shape_error() {
        assert!(serde_json::from_str::<ItemDraft>(r#"{"name": "x"}"#).is_err());
    }

    #[test]
    fn changes_only_check_supplied_fields() {
        let changes: ItemChanges = serde_json::from_str(r#"{"tax": null}"#).unwrap();
        let patch = changes.validate().unwrap();
        assert_eq!(patch.tax, Patch::Set(None));
        assert_eq!(patch.name, Patch::Unset);

        let changes: ItemChanges = serde_json::from_str(r#"{"price": -3.0}"#).unwrap();
        assert!(matches!(changes.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn patch_merges_supplied_fields() {
        let mut item = Item::build(
            1,
            NewItem {
                name: "Lamp".into(),
                description: Some("desk lamp".into()),
                price: 20.0,
                tax: Some(2.0),
            },
            Utc::now(),
        );
        item.apply_patch(
            ItemPatch {
                price: Patch::Set(25.0),
                tax: Patch::Set(None),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(item.name, "Lamp");
        assert_eq!(item.description.as_deref(), Some("desk lamp"));
        assert_eq!(item.price, 25.0);
        assert_eq!(item.tax, None);
    }
}
