// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证配置读取、缺省值与服务配置重载
// ==========================================


use openlmis_requisition::config::{
    config_keys, ConfigManager, RequisitionConfigReader, RequisitionSettings,
};
use openlmis_requisition::domain::RequisitionStatus;
use std::sync::{Arc, Mutex};
use test_helpers::{create_test_db, insert_test_config, open_test_connection, TestWorld};

#[tokio::test]
async fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[tokio::test]
async fn test_skip_authorization_defaults_to_false() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    // 未配置的键: 原始读取为 None，业务读取取缺省值
    assert_eq!(
        config_manager
            .get_bool_value(config_keys::SKIP_AUTHORIZATION)
            .unwrap(),
        None
    );
    assert!(!config_manager.get_skip_authorization().await.unwrap());

    let settings = RequisitionSettings::load(&config_manager).await.unwrap();
    assert_eq!(settings, RequisitionSettings::default());
}

#[tokio::test]
async fn test_skip_authorization_read_from_config_kv() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn, true).expect("Failed to insert test config");

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert!(config_manager.get_skip_authorization().await.unwrap());
    let settings = RequisitionSettings::load(&config_manager).await.unwrap();
    assert_eq!(settings.approval_step_status(), RequisitionStatus::Submitted);
}

#[tokio::test]
async fn test_unknown_key_is_none() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(config_manager.get_bool_value("noSuchKey").unwrap(), None);
    assert_eq!(config_manager.get_global_config_value("noSuchKey").unwrap(), None);
}

#[tokio::test]
async fn test_set_value_and_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config_manager
        .set_global_config_value(config_keys::SKIP_AUTHORIZATION, "true")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::SKIP_AUTHORIZATION, "false")
        .unwrap();

    assert_eq!(
        config_manager
            .get_bool_value(config_keys::SKIP_AUTHORIZATION)
            .unwrap(),
        Some(false)
    );

    let snapshot: serde_json::Value =
        serde_json::from_str(&config_manager.get_config_snapshot().unwrap()).unwrap();
    assert_eq!(snapshot[config_keys::SKIP_AUTHORIZATION], "false");
}

#[tokio::test]
async fn test_service_reload_settings() {
    let world = TestWorld::new();
    let service = world.service(RequisitionSettings::default());

    let config_manager = ConfigManager::from_connection(Arc::clone(&world.conn))
        .expect("Failed to create ConfigManager");
    config_manager
        .set_global_config_value(config_keys::SKIP_AUTHORIZATION, "yes")
        .unwrap();

    let reloaded = service.reload_settings(&config_manager).await.unwrap();
    assert!(reloaded.skip_authorization);
    assert_eq!(service.settings(), reloaded);
}

#[test]
fn test_shared_connection_type() {
    // ConfigManager 可与仓储共享同一连接
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = Arc::new(Mutex::new(open_test_connection(&db_path).unwrap()));
    assert!(ConfigManager::from_connection(conn).is_ok());
}
