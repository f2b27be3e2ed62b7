//! HCL block model produced by generators.

use serde::Serialize;

use crate::model::PropertyValue;

/// A value expression on the right-hand side of an attribute.
///
/// `String` values are raw semantic text; the writer quotes and escapes
/// them. `Expression` values are emitted verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HclValue {
    String(String),
    Expression(String),
    Number(serde_json::Number),
    Bool(bool),
    List(Vec<HclValue>),
    Object(Vec<(String, HclValue)>),
}

impl HclValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn expr(expression: impl Into<String>) -> Self {
        Self::Expression(expression.into())
    }

    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|s| Self::String(s.into())).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&str> {
        match self {
            Self::Expression(e) => Some(e),
            _ => None,
        }
    }
}

impl From<&PropertyValue> for HclValue {
    fn from(value: &PropertyValue) -> Self {
        match value {
            PropertyValue::String(s) => Self::String(s.clone()),
            PropertyValue::Reference { expression } => Self::Expression(expression.clone()),
            PropertyValue::Number(n) => Self::Number(n.clone()),
            PropertyValue::Bool(b) => Self::Bool(*b),
            PropertyValue::List(items) => Self::List(items.iter().map(Self::from).collect()),
        }
    }
}

impl From<&str> for HclValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for HclValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for HclValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for HclValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// One entry of a block body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyItem {
    Attribute(String, HclValue),
    Block(HclBlock),
}

/// A typed, labeled group of attributes and nested blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HclBlock {
    pub block_type: String,
    pub labels: Vec<String>,
    pub body: Vec<BodyItem>,
}

impl HclBlock {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            labels: Vec::new(),
            body: Vec::new(),
        }
    }

    /// `resource "<terraform_type>" "<label>" { ... }`
    pub fn resource(terraform_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new("resource").with_label(terraform_type).with_label(label)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Set an attribute. An existing key keeps its position and takes the new value.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<HclValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Set an attribute only when a value is present.
    pub fn attr_opt(self, key: impl Into<String>, value: Option<impl Into<HclValue>>) -> Self {
        match value {
            Some(v) => self.attr(key, v),
            None => self,
        }
    }

    pub fn block(mut self, child: HclBlock) -> Self {
        self.body.push(BodyItem::Block(child));
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<HclValue>) {
        let key = key.into();
        let value = value.into();
        for item in &mut self.body {
            if let BodyItem::Attribute(existing, slot) = item {
                if *existing == key {
                    *slot = value;
                    return;
                }
            }
        }
        self.body.push(BodyItem::Attribute(key, value));
    }

    pub fn attribute(&self, key: &str) -> Option<&HclValue> {
        self.body.iter().find_map(|item| match item {
            BodyItem::Attribute(k, v) if k == key => Some(v),
            _ => None,
        })
    }

    pub fn nested(&self, block_type: &str) -> impl Iterator<Item = &HclBlock> {
        let block_type = block_type.to_string();
        self.body.iter().filter_map(move |item| match item {
            BodyItem::Block(b) if b.block_type == block_type => Some(b),
            _ => None,
        })
    }

    /// `<type>.<name>` for resource and data blocks.
    pub fn address(&self) -> Option<String> {
        match (self.block_type.as_str(), self.labels.as_slice()) {
            ("resource", [tf_type, name]) => Some(format!("{}.{}", tf_type, name)),
            ("data", [tf_type, name]) => Some(format!("data.{}.{}", tf_type, name)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let block = HclBlock::resource("azurerm_subnet", "web")
            .attr("name", "first")
            .attr("address_prefixes", HclValue::string_list(["10.0.1.0/24"]))
            .attr("name", "second");

        assert_eq!(block.body.len(), 2);
        assert_eq!(block.attribute("name").and_then(HclValue::as_str), Some("second"));
        assert!(matches!(&block.body[0], BodyItem::Attribute(k, _) if k == "name"));
    }

    #[test]
    fn test_address() {
        assert_eq!(
            HclBlock::resource("azurerm_subnet", "web").address().as_deref(),
            Some("azurerm_subnet.web")
        );
        assert_eq!(HclBlock::new("locals").address(), None);
    }

    #[test]
    fn test_property_value_conversion() {
        let value = HclValue::from(&PropertyValue::reference("azurerm_resource_group.rg.name"));
        assert_eq!(value.as_expression(), Some("azurerm_resource_group.rg.name"));

        let value = HclValue::from(&PropertyValue::string("x"));
        assert_eq!(value.as_str(), Some("x"));
    }

    #[test]
    fn test_nested_blocks() {
        let block = HclBlock::new("provider")
            .with_label("azurerm")
            .block(HclBlock::new("features"));
        assert_eq!(block.nested("features").count(), 1);
    }
}
