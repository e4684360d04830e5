use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{TransactionPatch, TransactionRecord};

/// One typed field value carried by an update directive.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Amount(Decimal),
    Flag(bool)
}

/// Provider-style partial update built from field-name to optional-value
/// pairs. Null values are skipped, so an applied directive only ever
/// touches the fields it names.
#[derive(Debug, Clone, Default)]
pub struct UpdateDirective {
    fields: BTreeMap<String, FieldValue>
}

impl UpdateDirective {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(self, field: &str, value: Option<String>) -> Self {
        self.set(field, value.map(FieldValue::Text))
    }

    pub fn set_date(self, field: &str, value: Option<NaiveDate>) -> Self {
        self.set(field, value.map(FieldValue::Date))
    }

    pub fn set_amount(self, field: &str, value: Option<Decimal>) -> Self {
        self.set(field, value.map(FieldValue::Amount))
    }

    pub fn set_flag(self, field: &str, value: Option<bool>) -> Self {
        self.set(field, value.map(FieldValue::Flag))
    }

    fn set(mut self, field: &str, value: Option<FieldValue>) -> Self {
        if let Some(value) = value {
            self.fields.insert(field.to_string(), value);
        }

        self
    }

    pub fn from_patch(patch: &TransactionPatch) -> Self {
        Self::new()
            .set_text("title", patch.title.clone())
            .set_date("date", patch.date)
            .set_amount("amount", patch.amount)
            .set_text("description", patch.description.clone())
            .set_flag("status", patch.status)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The `SET #field = :field, ...` expression over the named fields.
    pub fn expression(&self) -> String {
        let assignments: Vec<String> = self
            .fields
            .keys()
            .map(|field| format!("#{field} = :{field}"))
            .collect();

        format!("SET {}", assignments.join(", "))
    }

    /// Placeholder-to-attribute name map (`#title` -> `title`).
    pub fn attribute_names(&self) -> BTreeMap<String, String> {
        self.fields
            .keys()
            .map(|field| (format!("#{field}"), field.clone()))
            .collect()
    }

    /// Placeholder-to-value map (`:title` -> value).
    pub fn attribute_values(&self) -> BTreeMap<String, FieldValue> {
        self.fields
            .iter()
            .map(|(field, value)| (format!(":{field}"), value.clone()))
            .collect()
    }

    /// Applies the directive to an in-memory row, the way the provider
    /// would apply the emitted expression.
    pub fn apply_to(&self, record: &mut TransactionRecord) {
        for (field, value) in &self.fields {
            match (field.as_str(), value) {
                ("title", FieldValue::Text(text)) => record.title = text.clone(),
                ("date", FieldValue::Date(date)) => record.date = *date,
                ("amount", FieldValue::Amount(amount)) => record.amount = *amount,
                ("description", FieldValue::Text(text)) => record.description = Some(text.clone()),
                ("status", FieldValue::Flag(flag)) => record.status = *flag,
                _ => {}
            }
        }
    }
}
