use glam::{Vec3, Vec4};

use path_tracer::core::{ParamValue, ParameterTable, ProgramLayout};
use path_tracer::scene::{FieldKind, SceneFile, ScenePool, Sphere};
use path_tracer::settings::{AccumulationMode, SettingsState};
use path_tracer::Error;

fn table(pool: &ScenePool) -> ParameterTable {
    ParameterTable::new(ProgramLayout::path_tracer(pool.len()))
}

#[test]
fn test_default_pool_light_array() {
    let pool = ScenePool::default();
    let mut params = table(&pool);
    pool.set_data(FieldKind::LightIntensity, &mut params).unwrap();

    assert_eq!(params.floats("SPHERE_LITE").unwrap(), &[5.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_field_arrays_follow_pool_order() {
    let pool = ScenePool::default();
    match pool.field_array(FieldKind::Position) {
        ParamValue::Vec3Array(positions) => {
            assert_eq!(positions.len(), 5);
            assert_eq!(positions[2], Vec3::new(4.0, 0.0, 0.0));
            assert_eq!(positions[4], Vec3::new(-4.0, 0.0, 0.0));
        }
        other => panic!("unexpected {:?}", other.kind()),
    }
    match pool.field_array(FieldKind::DiffuseColor) {
        ParamValue::Vec4Array(colors) => assert_eq!(colors[3], Vec4::new(0.0, 1.0, 0.0, 1.0)),
        other => panic!("unexpected {:?}", other.kind()),
    }
}

#[test]
fn test_edit_is_visible_only_after_set_data() {
    let mut pool = ScenePool::default();
    let mut params = table(&pool);
    pool.set_data(FieldKind::Radius, &mut params).unwrap();

    pool.get_mut(1).unwrap().radius = 12.0;
    assert_eq!(params.floats("SPHERE_RADIUS").unwrap()[1], 30.0);

    pool.set_data(FieldKind::Radius, &mut params).unwrap();
    assert_eq!(params.floats("SPHERE_RADIUS").unwrap()[1], 12.0);
}

#[test]
fn test_every_field_kind_syncs() {
    let pool = ScenePool::default();
    let mut params = table(&pool);
    for kind in FieldKind::ALL {
        pool.set_data(kind, &mut params).unwrap();
    }
    assert_eq!(params.dirty_arrays().count(), FieldKind::ALL.len());
}

#[test]
fn test_unknown_field_is_fatal() {
    let pool = ScenePool::default();
    let mut params = table(&pool);
    assert!(matches!(
        pool.set_data_named("SPHERE_MASS", &mut params),
        Err(Error::UnknownField(_))
    ));
    assert!(matches!(FieldKind::try_from(8u32), Err(Error::UnknownField(_))));
}

#[test]
fn test_scene_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");

    let pool = ScenePool::new(vec![
        Sphere::light("Sun", Vec3::new(0.0, 50.0, 0.0), 20.0, Vec3::new(1.0, 0.9, 0.8), 8.0),
        Sphere::diffuse("Ball", Vec3::ZERO, 1.5, Vec4::new(0.2, 0.4, 0.6, 1.0), 0.3, 0.9),
    ])
    .unwrap();
    let mut file = SceneFile::from(&pool);
    file.settings = Some(SettingsState {
        accumulation: AccumulationMode::Weighted,
        ..SettingsState::default()
    });
    file.save(&path).unwrap();

    let (loaded, settings) = SceneFile::load(&path).unwrap().into_parts().unwrap();
    assert_eq!(loaded, pool);
    assert_eq!(settings.unwrap().accumulation, AccumulationMode::Weighted);
}

#[test]
fn test_scene_file_clamps_materials_and_defaults_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    std::fs::write(
        &path,
        r#"{
            "spheres": [
                { "id": "Lamp", "position": [0.0, 5.0, 0.0], "radius": 1.0,
                  "material": { "light_color": [1.0, 1.0, 1.0], "light_intensity": 500.0, "gloss": 2.0 } }
            ]
        }"#,
    )
    .unwrap();

    let (pool, settings) = SceneFile::load(&path).unwrap().into_parts().unwrap();
    let material = &pool.get(0).unwrap().material;
    assert_eq!(material.light_intensity(), 100.0);
    assert_eq!(material.gloss(), 1.0);
    assert!(settings.is_none());
}

#[test]
fn test_empty_scene_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.json");
    std::fs::write(&path, r#"{ "spheres": [] }"#).unwrap();

    let result = SceneFile::load(&path).unwrap().into_parts();
    assert!(matches!(result, Err(Error::PoolSize { actual: 0, .. })));
}
