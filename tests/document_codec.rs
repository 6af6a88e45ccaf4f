//! Integration tests for encoding templates to documents and back

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use stackform::token::timestamp_codec;
use stackform::{
    from_document, interpolate, parse, render, to_document, CodecError, Condition, Intrinsic,
    Literal, Output, Parameter, Resource, Template, Timestamp, Token,
};

#[test]
fn test_parameter_reference_encoding() {
    let token: Token<String> = Token::reference("Owner");
    assert_eq!(token.to_value(), json!({"Ref": "Owner"}));
}

#[test]
fn test_join_encoding() {
    let token = Token::join("", ["a".into(), Token::reference("p")]);
    assert_eq!(token.to_value(), json!({"Fn::Join": ["", ["a", {"Ref": "p"}]]}));
}

#[test]
fn test_interpolation_alternates_segments_and_holes() {
    let token = interpolate(
        ["pre-", "-mid-", "-post"],
        [Token::<String>::reference("p1"), Token::<String>::reference("p2")],
    )
    .expect("Should build");
    assert_eq!(
        token,
        Token::call(Intrinsic::Join {
            delimiter: String::new(),
            values: vec![
                Token::Literal("pre-".to_string()),
                Token::Ref("p1".to_string()),
                Token::Literal("-mid-".to_string()),
                Token::Ref("p2".to_string()),
                Token::Literal("-post".to_string()),
            ],
        })
    );
}

#[test]
fn test_timestamp_roundtrip() {
    let decoded = Timestamp::from_value(&json!("2024-03-01T12:00:00Z")).expect("Should decode");
    assert_eq!(decoded.to_value(), json!("2024-03-01T12:00:00Z"));
    assert_eq!(timestamp_codec().encode(&decoded), "2024-03-01T12:00:00Z");
}

#[test]
fn test_timestamp_rejects_garbage() {
    let err = Timestamp::from_value(&json!("not-a-date")).expect_err("Should fail");
    assert!(matches!(err, CodecError::Format { .. }));
}

#[test]
fn test_ref_object_always_decodes_as_reference() {
    let token = Token::<Value>::from_value(&json!({"Ref": "X"})).expect("Should decode");
    assert_eq!(token, Token::Ref("X".to_string()));
}

#[test]
fn test_not_encodes_as_list_and_decodes_both_forms() {
    let token = Token::not(Token::condition("IsProd"));
    assert_eq!(token.to_value(), json!({"Fn::Not": [{"Condition": "IsProd"}]}));

    let bare = Token::<bool>::from_value(&json!({"Fn::Not": {"Condition": "IsProd"}}))
        .expect("Should decode");
    assert_eq!(bare, token);
}

#[test]
fn test_sub_forms() {
    let plain = Token::sub("${AWS::StackName}-logs");
    assert_eq!(plain.to_value(), json!({"Fn::Sub": "${AWS::StackName}-logs"}));

    let bound = Token::sub_with("${Name}-logs", [("Name", Token::<String>::reference("Stage"))]);
    assert_eq!(
        bound.to_value(),
        json!({"Fn::Sub": ["${Name}-logs", {"Name": {"Ref": "Stage"}}]})
    );
}

fn web_stack() -> Template {
    let is_prod = Condition::new(
        "IsProd",
        Token::equals::<String>(Token::<String>::reference("Env"), "prod"),
    );
    let size: Token<String> = is_prod.select("m5.large".to_string(), "t3.micro".to_string());

    Template::empty()
        .with_format_version("2010-09-09")
        .with_description("web tier")
        .with_parameter(
            Parameter::string("Env")
                .with_allowed_values(["dev".to_string(), "prod".to_string()])
                .with_default("dev".to_string()),
        )
        .with_condition(is_prod)
        .with_resource(
            Resource::new("Web", "AWS::EC2::Instance")
                .with_property("InstanceType", size)
                .with_property(
                    "AvailabilityZone",
                    Token::<String>::select(0, Token::get_azs("")),
                )
                .with_property(
                    "UserData",
                    Token::base64(Token::sub("#!/bin/sh\necho ${AWS::Region}\n")),
                )
                .with_property("Tags", json!([{"Key": "Team", "Value": "web"}]))
                .with_property("Launched", Timestamp::new("2024-03-01T12:00:00Z".parse().expect("Should parse")))
                .with_depends_on("Sg"),
        )
        .with_resource(Resource::new("Sg", "AWS::EC2::SecurityGroup"))
        .with_output(
            Output::new("Endpoint", Token::<String>::attribute("Web", "PublicDnsName"))
                .with_description("public DNS name")
                .with_condition("IsProd"),
        )
}

#[test]
fn test_full_template_roundtrip() {
    let template = web_stack();
    let document = to_document(&template).expect("Should encode");
    let decoded = from_document(&document).expect("Should decode");
    assert_eq!(decoded, template);
}

#[test]
fn test_roundtrip_through_text() {
    let template = web_stack();
    let text = render(&template).expect("Should render");
    assert_eq!(parse(&text).expect("Should parse"), template);
}

#[test]
fn test_document_shape() {
    let document = to_document(&web_stack()).expect("Should encode");
    assert_eq!(document["AWSTemplateFormatVersion"], json!("2010-09-09"));
    assert_eq!(
        document["Resources"]["Web"]["Properties"]["InstanceType"],
        json!({"Fn::If": ["IsProd", "m5.large", "t3.micro"]})
    );
    assert_eq!(
        document["Resources"]["Web"]["Properties"]["AvailabilityZone"],
        json!({"Fn::Select": [0, {"Fn::GetAZs": ""}]})
    );
    assert_eq!(document["Resources"]["Web"]["DependsOn"], json!(["Sg"]));
    assert_eq!(
        document["Conditions"]["IsProd"],
        json!({"Fn::Equals": [{"Ref": "Env"}, "prod"]})
    );
}

#[test]
fn test_decode_foreign_document() {
    let document = json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Parameters": {
            "Size": {"Type": "Number", "MinValue": 1, "MaxValue": 10, "NoEcho": true}
        },
        "Mappings": {
            "Regions": {"us-east-1": {"Ami": "ami-123"}}
        },
        "Resources": {
            "Queue": {
                "Type": "AWS::SQS::Queue",
                "DependsOn": "Topic",
                "Properties": {
                    "QueueName": {"Fn::Join": ["-", [{"Ref": "AWS::StackName"}, "q"]]},
                    "DelaySeconds": {"Ref": "Size"}
                },
                "DeletionPolicy": "Retain"
            },
            "Topic": {"Type": "AWS::SNS::Topic"}
        }
    });
    let template = from_document(&document).expect("Should decode");

    let size = template.parameter("Size").expect("Should have parameter");
    assert_eq!(size.kind, Parameter::NUMBER);
    assert!(size.no_echo);
    assert_eq!(size.max_value, Some(10.into()));

    let queue = template.resource("Queue").expect("Should have resource");
    assert_eq!(queue.depends_on, vec!["Topic"]);
    assert_eq!(queue.property("DelaySeconds"), Some(&Token::Ref("Size".to_string())));

    assert_eq!(to_document(&template).expect("Should encode")["Mappings"], document["Mappings"]);
}

#[test]
fn test_decode_reports_location() {
    let document = json!({
        "Resources": {
            "Web": {
                "Type": "AWS::EC2::Instance",
                "Properties": {"ImageId": {"Fn::Join": ["-", ["a", 7]]}}
            }
        }
    });
    let err = from_document(&document).expect_err("Should fail");
    assert!(matches!(err, CodecError::Format { .. }));
    assert_eq!(err.context(), Some("Resources.Web.Properties.ImageId.Fn::Join.[1].string"));
}
