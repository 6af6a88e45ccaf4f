//! Encoding and decoding of whole templates

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::config::RenderConfig;
use crate::error::CodecError;
use crate::template::{
    Category, Condition, DeletionPolicy, Mapping, Output, Parameter, Resource, Template,
};
use crate::token::{mismatch, Literal, Record, Token};
use crate::RenderError;

use super::fold::fold_constants;

const FORMAT_VERSION: &str = "AWSTemplateFormatVersion";
const DESCRIPTION: &str = "Description";

/// Encode a template with the default configuration
pub fn to_document(template: &Template) -> Result<Value, RenderError> {
    to_document_with(template, &RenderConfig::default())
}

/// Encode a template as a document value
///
/// Fails if any category holds the same logical name twice. `Resources` is
/// always present; the other sections only when non-empty, unless the
/// configuration asks for empty ones too.
pub fn to_document_with(template: &Template, config: &RenderConfig) -> Result<Value, RenderError> {
    template.validate()?;

    let mut document = Map::new();

    if let Some(version) = template
        .format_version
        .as_ref()
        .or(config.default_format_version.as_ref())
    {
        document.insert(FORMAT_VERSION.to_string(), Value::String(version.clone()));
    }
    if let Some(description) = &template.description {
        document.insert(DESCRIPTION.to_string(), Value::String(description.clone()));
    }

    let parameters = template
        .parameters
        .iter()
        .map(|p| Ok((p.name.clone(), serde_json::to_value(p)?)))
        .collect::<Result<Map<_, _>, serde_json::Error>>()
        .map_err(CodecError::from)?;
    let conditions = template
        .conditions
        .iter()
        .map(|c| (c.name.clone(), c.expression.to_value()))
        .collect();
    let mappings = template
        .mappings
        .iter()
        .map(|m| (m.name.clone(), encode_mapping(m)))
        .collect();
    let mut resources: Map<String, Value> = template
        .resources
        .iter()
        .map(|r| (r.name.clone(), encode_resource(r)))
        .collect();
    let mut outputs: Map<String, Value> = template
        .outputs
        .iter()
        .map(|o| (o.name.clone(), encode_output(o)))
        .collect();

    if config.fold_constants {
        resources = fold_section(resources);
        outputs = fold_section(outputs);
    }

    let sections = [
        (Category::Parameters, parameters),
        (Category::Conditions, conditions),
        (Category::Mappings, mappings),
        (Category::Resources, resources),
        (Category::Outputs, outputs),
    ];
    for (category, entries) in sections {
        if entries.is_empty() && category != Category::Resources && !config.empty_sections {
            continue;
        }
        document.insert(category.key().to_string(), Value::Object(entries));
    }

    tracing::debug!(
        parameters = template.parameters.len(),
        resources = template.resources.len(),
        outputs = template.outputs.len(),
        "encoded template"
    );

    Ok(Value::Object(document))
}

fn fold_section(entries: Map<String, Value>) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(name, body)| (name, fold_constants(body)))
        .collect()
}

fn encode_mapping(mapping: &Mapping) -> Value {
    Value::Object(
        mapping
            .entries
            .iter()
            .map(|(top_key, inner)| {
                let inner = inner
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                (top_key.clone(), Value::Object(inner))
            })
            .collect(),
    )
}

fn encode_resource(resource: &Resource) -> Value {
    let mut body = Map::new();
    body.insert("Type".to_string(), Value::String(resource.kind.clone()));
    if let Some(condition) = &resource.condition {
        body.insert("Condition".to_string(), Value::String(condition.clone()));
    }
    if !resource.depends_on.is_empty() {
        let depends_on = resource
            .depends_on
            .iter()
            .map(|name| Value::String(name.clone()))
            .collect();
        body.insert("DependsOn".to_string(), Value::Array(depends_on));
    }
    if !resource.properties.is_empty() {
        body.insert("Properties".to_string(), resource.properties.to_value());
    }
    if let Some(metadata) = &resource.metadata {
        body.insert("Metadata".to_string(), metadata.clone());
    }
    if let Some(policy) = &resource.creation_policy {
        body.insert("CreationPolicy".to_string(), policy.clone());
    }
    if let Some(policy) = &resource.update_policy {
        body.insert("UpdatePolicy".to_string(), policy.clone());
    }
    if let Some(policy) = resource.deletion_policy {
        body.insert("DeletionPolicy".to_string(), Value::String(policy.as_str().to_string()));
    }
    if let Some(policy) = resource.update_replace_policy {
        body.insert(
            "UpdateReplacePolicy".to_string(),
            Value::String(policy.as_str().to_string()),
        );
    }
    Value::Object(body)
}

fn encode_output(output: &Output) -> Value {
    let mut body = Map::new();
    if let Some(description) = &output.description {
        body.insert("Description".to_string(), Value::String(description.clone()));
    }
    body.insert("Value".to_string(), output.value.to_value());
    if let Some(export) = &output.export {
        let mut name = Map::new();
        name.insert("Name".to_string(), export.to_value());
        body.insert("Export".to_string(), Value::Object(name));
    }
    if let Some(condition) = &output.condition {
        body.insert("Condition".to_string(), Value::String(condition.clone()));
    }
    Value::Object(body)
}

/// Decode a document value into a template
pub fn from_document(document: &Value) -> Result<Template, CodecError> {
    let root = object(document).map_err(|e| e.within("template"))?;
    if !root.contains_key(Category::Resources.key()) {
        return Err(CodecError::format("template", "missing Resources section"));
    }

    let mut template = Template::empty();
    for (key, value) in root {
        match key.as_str() {
            FORMAT_VERSION => {
                template.format_version =
                    Some(String::from_value(value).map_err(|e| e.within(key))?);
            }
            DESCRIPTION => {
                template.description = Some(String::from_value(value).map_err(|e| e.within(key))?);
            }
            "Parameters" => {
                template.parameters = decode_section(key, value, decode_parameter)?;
            }
            "Conditions" => {
                template.conditions = decode_section(key, value, decode_condition)?;
            }
            "Mappings" => {
                template.mappings = decode_section(key, value, decode_mapping)?;
            }
            "Resources" => {
                template.resources = decode_section(key, value, decode_resource)?;
            }
            "Outputs" => {
                template.outputs = decode_section(key, value, decode_output)?;
            }
            other => {
                return Err(CodecError::format(
                    "template",
                    format!("unknown top-level section '{}'", other),
                ))
            }
        }
    }

    tracing::debug!(
        parameters = template.parameters.len(),
        resources = template.resources.len(),
        outputs = template.outputs.len(),
        "decoded template"
    );

    Ok(template)
}

fn object(value: &Value) -> Result<&Map<String, Value>, CodecError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(mismatch("object", other)),
    }
}

fn decode_section<E>(
    section: &str,
    value: &Value,
    decode: fn(&str, &Value) -> Result<E, CodecError>,
) -> Result<Vec<E>, CodecError> {
    object(value)
        .map_err(|e| e.within(section))?
        .iter()
        .map(|(name, body)| {
            decode(name, body).map_err(|e| e.within(&format!("{}.{}", section, name)))
        })
        .collect()
}

fn decode_parameter(name: &str, body: &Value) -> Result<Parameter, CodecError> {
    let mut parameter: Parameter = serde_json::from_value(body.clone())
        .map_err(|e| CodecError::format("", e.to_string()))?;
    parameter.name = name.to_string();
    Ok(parameter)
}

fn decode_condition(name: &str, body: &Value) -> Result<Condition, CodecError> {
    Ok(Condition::new(name, Token::<bool>::from_value(body)?))
}

fn decode_mapping(name: &str, body: &Value) -> Result<Mapping, CodecError> {
    let mut entries = IndexMap::new();
    for (top_key, inner) in object(body)? {
        let inner = object(inner)
            .map_err(|e| e.within(top_key))?
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        entries.insert(top_key.clone(), inner);
    }
    Ok(Mapping {
        name: name.to_string(),
        entries,
    })
}

fn decode_resource(name: &str, body: &Value) -> Result<Resource, CodecError> {
    let mut kind = None;
    let mut resource = Resource::new(name, String::new());

    for (key, value) in object(body)? {
        let in_key = |e: CodecError| e.within(key);
        match key.as_str() {
            "Type" => kind = Some(String::from_value(value).map_err(in_key)?),
            "Properties" => {
                resource.properties = Record::<Value>::from_value(value).map_err(in_key)?;
            }
            "DependsOn" => {
                resource.depends_on = match value {
                    Value::String(single) => vec![single.clone()],
                    other => Vec::<Token<String>>::from_value(other)
                        .map_err(in_key)?
                        .into_iter()
                        .map(|token| match token {
                            Token::Literal(name) => Ok(name),
                            _ => Err(CodecError::format(
                                key.as_str(),
                                "expected logical name strings",
                            )),
                        })
                        .collect::<Result<_, _>>()?,
                };
            }
            "Condition" => resource.condition = Some(String::from_value(value).map_err(in_key)?),
            "DeletionPolicy" => {
                resource.deletion_policy = Some(decode_policy(value).map_err(in_key)?);
            }
            "UpdateReplacePolicy" => {
                resource.update_replace_policy = Some(decode_policy(value).map_err(in_key)?);
            }
            "CreationPolicy" => resource.creation_policy = Some(value.clone()),
            "UpdatePolicy" => resource.update_policy = Some(value.clone()),
            "Metadata" => resource.metadata = Some(value.clone()),
            other => {
                return Err(CodecError::format(
                    "",
                    format!("unknown resource attribute '{}'", other),
                ))
            }
        }
    }

    resource.kind = kind.ok_or_else(|| CodecError::format("", "missing Type"))?;
    Ok(resource)
}

fn decode_policy(value: &Value) -> Result<DeletionPolicy, CodecError> {
    let name = String::from_value(value)?;
    DeletionPolicy::from_name(&name)
        .ok_or_else(|| CodecError::format("", format!("unknown policy '{}'", name)))
}

fn decode_output(name: &str, body: &Value) -> Result<Output, CodecError> {
    let body = object(body)?;
    let value = body
        .get("Value")
        .ok_or_else(|| CodecError::format("", "missing Value"))?;
    let mut output = Output::new(
        name,
        Token::<Value>::from_value(value).map_err(|e| e.within("Value"))?,
    );

    for (key, value) in body {
        match key.as_str() {
            "Value" => {}
            "Description" => {
                output.description = Some(String::from_value(value).map_err(|e| e.within(key))?);
            }
            "Export" => {
                let export = object(value).map_err(|e| e.within(key))?;
                let export_name = export
                    .get("Name")
                    .ok_or_else(|| CodecError::format(key.as_str(), "missing Name"))?;
                output.export = Some(
                    Token::<String>::from_value(export_name)
                        .map_err(|e| e.within("Export.Name"))?,
                );
            }
            "Condition" => {
                output.condition = Some(String::from_value(value).map_err(|e| e.within(key))?);
            }
            other => {
                return Err(CodecError::format(
                    "",
                    format!("unknown output attribute '{}'", other),
                ))
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Template {
        Template::empty()
            .with_description("sample")
            .with_parameter(Parameter::string("Env").with_default("dev".to_string()))
            .with_condition(Condition::new(
                "IsProd",
                Token::equals::<String>(Token::<String>::reference("Env"), Token::lit("prod".to_string())),
            ))
            .with_mapping(Mapping::new("Sizes").with_entry("prod", "Instance", "m5.large".to_string()))
            .with_resource(
                Resource::new("Web", "AWS::EC2::Instance")
                    .with_property("InstanceType", Token::<String>::find_in_map("Sizes", Token::<String>::reference("Env"), "Instance"))
                    .with_condition("IsProd")
                    .with_deletion_policy(DeletionPolicy::Retain),
            )
            .with_output(
                Output::new("WebIp", Token::<String>::attribute("Web", "PublicIp"))
                    .with_export(Token::sub("${AWS::StackName}-WebIp")),
            )
    }

    #[test]
    fn test_encode_sections_in_order() {
        let document = to_document(&sample()).unwrap();
        let keys: Vec<_> = document.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["Description", "Parameters", "Conditions", "Mappings", "Resources", "Outputs"]
        );
    }

    #[test]
    fn test_encode_resource_body() {
        let document = to_document(&sample()).unwrap();
        assert_eq!(
            document["Resources"]["Web"],
            json!({
                "Type": "AWS::EC2::Instance",
                "Condition": "IsProd",
                "Properties": {
                    "InstanceType": {"Fn::FindInMap": ["Sizes", {"Ref": "Env"}, "Instance"]}
                },
                "DeletionPolicy": "Retain"
            })
        );
    }

    #[test]
    fn test_encode_parameter_skips_unset_fields() {
        let document = to_document(&sample()).unwrap();
        assert_eq!(
            document["Parameters"]["Env"],
            json!({"Type": "String", "Default": "dev"})
        );
    }

    #[test]
    fn test_encode_output_export() {
        let document = to_document(&sample()).unwrap();
        assert_eq!(
            document["Outputs"]["WebIp"],
            json!({
                "Value": {"Fn::GetAtt": ["Web", "PublicIp"]},
                "Export": {"Name": {"Fn::Sub": "${AWS::StackName}-WebIp"}}
            })
        );
    }

    #[test]
    fn test_empty_template_still_has_resources() {
        let document = to_document(&Template::empty()).unwrap();
        assert_eq!(document, json!({"Resources": {}}));
    }

    #[test]
    fn test_empty_sections_and_default_version() {
        let config = RenderConfig::new()
            .with_empty_sections(true)
            .with_default_format_version("2010-09-09");
        let document = to_document_with(&Template::empty(), &config).unwrap();
        assert_eq!(
            document,
            json!({
                "AWSTemplateFormatVersion": "2010-09-09",
                "Parameters": {},
                "Conditions": {},
                "Mappings": {},
                "Resources": {},
                "Outputs": {}
            })
        );
    }

    #[test]
    fn test_template_version_beats_default() {
        let config = RenderConfig::new().with_default_format_version("2010-09-09");
        let template = Template::empty().with_format_version("2099-01-01");
        let document = to_document_with(&template, &config).unwrap();
        assert_eq!(document["AWSTemplateFormatVersion"], json!("2099-01-01"));
    }

    #[test]
    fn test_encode_rejects_duplicates() {
        let template = Template::empty()
            .with_resource(Resource::new("Bastion", "AWS::EC2::Instance"))
            .with_resource(Resource::new("Bastion", "AWS::EC2::Instance"));
        let err = to_document(&template).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Template(TemplateError::DuplicateLogicalName { .. })
        ));
    }

    #[test]
    fn test_roundtrip_sample() {
        let template = sample();
        let decoded = from_document(&to_document(&template).unwrap()).unwrap();
        assert_eq!(decoded, template);
    }

    #[test]
    fn test_decode_requires_resources() {
        let err = from_document(&json!({"Description": "x"})).unwrap_err();
        assert!(err.to_string().contains("missing Resources"));
    }

    #[test]
    fn test_decode_unknown_section() {
        let err = from_document(&json!({"Resources": {}, "Rules": {}})).unwrap_err();
        assert!(err.to_string().contains("Rules"));
    }

    #[test]
    fn test_decode_depends_on_forms() {
        let document = json!({
            "Resources": {
                "A": {"Type": "AWS::SNS::Topic", "DependsOn": "B"},
                "B": {"Type": "AWS::SNS::Topic", "DependsOn": ["C", "D"]}
            }
        });
        let template = from_document(&document).unwrap();
        assert_eq!(template.resources[0].depends_on, vec!["B"]);
        assert_eq!(template.resources[1].depends_on, vec!["C", "D"]);
    }

    #[test]
    fn test_decode_error_has_location() {
        let document = json!({
            "Resources": {"Web": {"Type": "AWS::EC2::Instance", "DeletionPolicy": "Keep"}}
        });
        let err = from_document(&document).unwrap_err();
        assert_eq!(err.context(), Some("Resources.Web.DeletionPolicy"));
    }

    #[test]
    fn test_decode_missing_type() {
        let err = from_document(&json!({"Resources": {"Web": {}}})).unwrap_err();
        assert!(err.to_string().contains("missing Type"));
    }

    #[test]
    fn test_decode_condition_with_multiple_keys() {
        let document = json!({
            "Conditions": {"Odd": {"Fn::Equals": ["a", "b"], "Fn::Not": [true]}},
            "Resources": {}
        });
        let err = from_document(&document).unwrap_err();
        assert!(matches!(err, CodecError::UnrecognizedVariant { .. }));
    }

    #[test]
    fn test_condition_shaped_property_roundtrips() {
        let document = json!({
            "Resources": {
                "Policy": {
                    "Type": "AWS::IAM::ManagedPolicy",
                    "Properties": {
                        "Extra": {"Condition": {"Bool": {"aws:SecureTransport": "true"}}}
                    }
                }
            }
        });
        let template = from_document(&document).unwrap();
        assert_eq!(
            template.resources[0].property("Extra"),
            Some(&Token::Literal(json!({"Condition": {"Bool": {"aws:SecureTransport": "true"}}})))
        );
        assert_eq!(to_document(&template).unwrap(), document);
    }

    #[test]
    fn test_decode_unknown_parameter_attribute() {
        let document = json!({
            "Parameters": {"Env": {"Type": "String", "Colour": "blue"}},
            "Resources": {}
        });
        let err = from_document(&document).unwrap_err();
        assert!(matches!(err, CodecError::Format { .. }));
        assert_eq!(err.context(), Some("Parameters.Env"));
        assert!(err.to_string().contains("Colour"));
    }
}
