use std::path::PathBuf;

use rscpix::cpix::CpixDocument;
use rscpix::drm::DrmSystem;
use rscpix::error::Error;
use rscpix::json::JsonExporter;
use rscpix::titan::TitanExporter;
use uuid::Uuid;

const SD_KID: &str = "eb676abb-cb34-5e96-bbcf-616630f1a3da";
const HD_KID: &str = "1ab45440-532c-4399-94dc-5c5ad9584bac";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load() -> CpixDocument {
    CpixDocument::from_path(fixture("movie.xml")).expect("parse fixture")
}

#[test]
fn fixture_entities_are_parsed() {
    let doc = load();

    assert_eq!(doc.source(), Some(fixture("movie.xml").as_path()));
    assert_eq!(doc.content_keys().len(), 2);
    assert_eq!(doc.drm_systems().len(), 6);
    assert_eq!(doc.usage_rules().len(), 2);
    assert!(doc.orphan_kids().is_empty());

    assert_eq!(doc.content_keys()[0].kid.to_string(), SD_KID);
    assert_eq!(doc.content_keys()[0].key_hex(), "000102030405060708090a0b0c0d0e0f");
    assert_eq!(doc.content_keys()[1].key_hex(), "101112131415161718191a1b1c1d1e1f");
}

#[test]
fn pssh_data_per_drm_system() {
    let doc = load();
    let sd = Uuid::parse_str(SD_KID).unwrap();
    let systems: Vec<_> = doc.find_drm_systems(&sd).collect();

    assert_eq!(systems.len(), 3);
    assert_eq!(systems[0].system_id, DrmSystem::Widevine.to_uuid());
    assert_eq!(systems[0].pssh_data, "EhDrZ2q7yzRelrvPYWYw8aPaSOPclZsG");
    assert_eq!(systems[1].system_id, DrmSystem::PlayReady.to_uuid());
    assert_eq!(systems[1].pssh_data, "UFJPLXNk");
    // Upper-case kid in the document still joins.
    assert_eq!(systems[2].system_id, DrmSystem::Nagra.to_uuid());
    assert_eq!(
        systems[2].pssh_data,
        "eyJjb250ZW50SWQiOiJtb3ZpZSIsImtleUlkIjoiZWI2NzZhYmItY2IzNC01ZTk2LWJiY2YtNjE2NjMwZjFhM2RhIn0="
    );
}

#[test]
fn usage_rules_follow_resolution_order() {
    let doc = load();
    let rules = doc.usage_rules();

    assert_eq!(rules[0].kid.to_string(), SD_KID);
    assert_eq!(rules[0].video_filter.min_pixels, 0);
    assert_eq!(rules[0].video_filter.max_pixels, 921_600);
    assert!(rules[0].audio_filter);

    assert_eq!(rules[1].kid.to_string(), HD_KID);
    assert_eq!(rules[1].video_filter.min_pixels, 921_601);
    assert_eq!(rules[1].video_filter.max_pixels, 34_041_601);
    assert!(!rules[1].audio_filter);
}

#[test]
fn json_export_is_deterministic() {
    let first = JsonExporter::default().to_json(&load()).expect("json");
    let second = JsonExporter::default().to_json(&load()).expect("json");
    assert_eq!(first, second);

    let value: serde_json::Value = serde_json::from_str(&first).unwrap();
    let keys = value["content_key_list"].as_array().unwrap();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[1]["kid"], HD_KID);
    assert_eq!(keys[1]["drm_system_list"][1]["name"], "PLAYREADY");
    assert_eq!(keys[1]["drm_system_list"][1]["pssh_data"], "UFJPLWhk");
    assert_eq!(keys[1]["usage_rule"]["video_filter"]["min_pixels"], 921_601);
}

#[test]
fn titan_fragment_enumerates_rules_then_keys_then_systems() {
    let xml = TitanExporter::default().to_titan_xml(&load()).expect("xml");

    let order: Vec<(usize, &str)> = [
        r#"<drm idx="1" system_id="edef8ba9-79d6-4ace-a3c8-27dcd51d21ed" scheme_value="WIDEVINE">"#,
        r#"<data>UFJPLXNk</data>"#,
        r#"<drm idx="3" system_id="adb41c24-2dbf-4a6d-958b-4457c0d27b95" scheme_value="NAGRA">"#,
        r#"<key id="1ab45440-532c-4399-94dc-5c5ad9584bac" content="101112131415161718191a1b1c1d1e1f"/>"#,
        r#"<data>UFJPLWhk</data>"#,
        r#"<drm idx="6" system_id="adb41c24-2dbf-4a6d-958b-4457c0d27b95" scheme_value="NAGRA">"#,
    ]
    .iter()
    .map(|needle| (xml.find(needle).expect(needle), *needle))
    .collect();

    assert!(order.windows(2).all(|pair| pair[0].0 < pair[1].0));
    assert_eq!(xml.matches("<initialization_vector_size>8_bytes</initialization_vector_size>").count(), 6);
    assert!(!xml.contains(r#"idx="7""#));
}

#[test]
fn kpreset_splice_keeps_surrounding_text() {
    let host = std::fs::read_to_string(fixture("preset.kpreset")).unwrap();
    let exporter = TitanExporter::default();
    let fragment = exporter.to_titan_xml(&load()).expect("xml");
    let spliced = exporter
        .to_titan_xml_spliced(&load(), &host)
        .expect("splice");

    let open = host.find("<commonencryption>").unwrap();
    let close = host.find("</commonencryption>").unwrap() + "</commonencryption>".len();
    assert_eq!(spliced, format!("{}{}{}", &host[..open], fragment, &host[close..]));

    assert!(!spliced.contains("legacy"));
    assert_eq!(spliced.matches("<commonencryption>").count(), 1);
}

#[test]
fn splice_without_marker_fails() {
    let host = "<preset><video/></preset>";
    let err = TitanExporter::default()
        .to_titan_xml_spliced(&load(), host)
        .expect_err("should fail");
    assert!(matches!(err, Error::HostMarkerNotFound { .. }));
}

#[test]
fn missing_document_is_not_found() {
    let err = CpixDocument::from_path(fixture("absent.xml")).expect_err("should fail");
    assert!(matches!(err, Error::DocumentNotFound(_)));
}
