//! Full render -> submit -> apply cycles.

use formseal_core::{Capability, FormBase, FormKindCache, RecordState};
use formseal_types::{BlankOption, Constraint, CsrfBinding, FormDescriptor, ParamValue};
use serde_json::json;

use crate::common::{seal, submit};

struct AlbumForm;
impl FormBase for AlbumForm {
    const NAME: &'static str = "album_form";
}

struct SearchForm;
impl FormBase for SearchForm {
    const NAME: &'static str = "search_form";

    fn capabilities() -> Vec<Capability> {
        Vec::new()
    }
}

#[test]
fn rendered_album_form_round_trips_into_record() {
    let kinds = FormKindCache::model_aware();
    let seal = seal();

    let mut pass = kinds.composed::<AlbumForm>().begin_pass(["album"]);
    pass.record("name", None);
    pass.record(
        "artist_id",
        Some(Constraint::include(["1", "2"], BlankOption::Permitted)),
    );
    pass.record("tag_pks", Some(Constraint::subset(["10", "11"], BlankOption::Forbidden)));
    pass.bind_csrf(CsrfBinding::new("_csrf", "T1"));
    pass.set_form_version(json!(4));

    let payload = seal.finish_render(pass).unwrap().expect("form recorded inputs");
    let params = submit(
        &payload,
        &json!({
            "_csrf": "T1",
            "album": {"name": "Kind of Blue", "artist_id": "", "tag_pks": ["10", "11"]}
        }),
    );

    let mut record = RecordState::default();
    let parsed = seal.apply(&params, &mut record).unwrap();

    assert_eq!(parsed.form_version, Some(json!(4)));
    assert_eq!(record.fields["name"], ParamValue::from("Kind of Blue"));
    assert_eq!(record.fields["tag_pks"], ParamValue::from(vec!["10", "11"]));
    // Blank selection is allowed because the select offered an empty option.
    assert!(record.validations.is_valid());
}

#[test]
fn invalid_association_is_flagged_not_rejected() {
    let seal = seal();
    let descriptor = FormDescriptor::new(["artist_id"], ["album"])
        .unwrap()
        .with_constraint(
            "artist_id",
            Constraint::include(["1", "2"], BlankOption::Forbidden),
        )
        .unwrap();
    let payload = seal.seal(&descriptor).unwrap();
    let params = submit(&payload, &json!({"album": {"artist_id": "99"}}));

    let mut record = RecordState::default();
    seal.apply(&params, &mut record).unwrap();

    assert_eq!(record.fields["artist_id"], ParamValue::from("99"));
    assert_eq!(
        record.validations.errors(),
        vec![("artist_id".to_string(), "invalid value submitted")]
    );
}

#[test]
fn empty_render_pass_emits_nothing() {
    let seal = seal();
    let pass = FormKindCache::model_aware()
        .composed::<AlbumForm>()
        .begin_pass(["album"]);
    assert!(seal.finish_render(pass).unwrap().is_none());
}

#[test]
fn untracked_base_form_emits_nothing() {
    let kinds = FormKindCache::new(Vec::new());
    let mut pass = kinds.composed::<SearchForm>().begin_pass(Vec::<String>::new());
    pass.record("q", None);
    assert!(seal().finish_render(pass).unwrap().is_none());
}

#[test]
fn two_forms_on_one_page_are_sealed_independently() {
    let kinds = FormKindCache::model_aware();
    let seal = seal();
    let form = kinds.composed::<AlbumForm>();

    let mut album = form.begin_pass(["album"]);
    album.record("name", None);
    let mut artist = form.begin_pass(["artist"]);
    artist.record("name", None);
    artist.record("country", None);

    let album_payload = seal.finish_render(album).unwrap().unwrap();
    let artist_payload = seal.finish_render(artist).unwrap().unwrap();

    let album_fields = seal
        .open(&submit(&album_payload, &json!({})))
        .unwrap();
    assert_eq!(album_fields.columns(), ["name"]);
    let artist_fields = seal
        .open(&submit(&artist_payload, &json!({})))
        .unwrap();
    assert_eq!(artist_fields.columns(), ["name", "country"]);
}

#[test]
fn partial_rerender_merges_into_parent_pass() {
    let seal = seal();
    let mut pass = FormKindCache::model_aware()
        .composed::<AlbumForm>()
        .begin_pass(["album"]);
    pass.record("name", None);
    pass.isolate(|nested| {
        nested.record("artist_id", Some(Constraint::valid(true)));
    });

    let payload = seal.finish_render(pass).unwrap().unwrap();
    let descriptor = seal.open(&submit(&payload, &json!({}))).unwrap();
    assert_eq!(descriptor.columns(), ["name", "artist_id"]);
    assert_eq!(descriptor.valid_values()["artist_id"], Constraint::valid(true));
}

#[test]
fn precomputed_validity_is_resurfaced() {
    let seal = seal();
    let descriptor = FormDescriptor::new(["locked"], Vec::<String>::new())
        .unwrap()
        .with_constraint("locked", Constraint::valid(false))
        .unwrap();
    let payload = seal.seal(&descriptor).unwrap();
    let parsed = seal.parse(&submit(&payload, &json!({"locked": "1"}))).unwrap();
    assert!(!parsed.validations["locked"].valid);
}
