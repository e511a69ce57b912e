// ==========================================
// 申请单审批流 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接、仓储与服务实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::config::{ConfigManager, RequisitionSettings};
use crate::db;
use crate::repository::{
    FacilityRepository, GeographicRepository, PeriodRepository, ProgramRepository,
    RequisitionRepository, RequisitionStatusChangeRepository, RequisitionTemplateRepository,
};
use crate::service::RequisitionService;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "OPENLMIS_REQUISITION_DB_PATH";

/// 应用状态
///
/// 所有仓储共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 主数据仓储（主数据维护入口）
    pub geographic_repo: Arc<GeographicRepository>,
    pub facility_repo: Arc<FacilityRepository>,
    pub program_repo: Arc<ProgramRepository>,
    pub period_repo: Arc<PeriodRepository>,
    pub template_repo: Arc<RequisitionTemplateRepository>,

    /// 申请单服务
    pub requisition_service: Arc<RequisitionService>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表
    /// 2. 初始化所有Repository
    /// 3. 从 config_kv 加载工作流配置
    /// 4. 创建申请单服务
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        db::init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let geographic_repo = Arc::new(GeographicRepository::new(conn.clone()));
        let facility_repo = Arc::new(FacilityRepository::new(conn.clone()));
        let program_repo = Arc::new(ProgramRepository::new(conn.clone()));
        let period_repo = Arc::new(PeriodRepository::new(conn.clone()));
        let template_repo = Arc::new(RequisitionTemplateRepository::new(conn.clone()));
        let requisition_repo = Arc::new(RequisitionRepository::new(conn.clone()));
        let status_change_repo = Arc::new(RequisitionStatusChangeRepository::new(conn.clone()));

        // ==========================================
        // 加载配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let settings = RequisitionSettings::load(config_manager.as_ref())
            .await
            .map_err(|e| format!("无法加载申请单配置: {}", e))?;
        tracing::info!(skip_authorization = settings.skip_authorization, "申请单配置已加载");

        let requisition_service = Arc::new(RequisitionService::new(
            requisition_repo,
            template_repo.clone(),
            status_change_repo,
            program_repo.clone(),
            facility_repo.clone(),
            period_repo.clone(),
            settings,
        ));

        Ok(Self {
            db_path,
            config_manager,
            geographic_repo,
            facility_repo,
            program_repo,
            period_repo,
            template_repo,
            requisition_service,
        })
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 OPENLMIS_REQUISITION_DB_PATH（非空时）
/// - 开发环境: 用户数据目录/openlmis-requisition-dev/requisition.db
/// - 生产环境: 用户数据目录/openlmis-requisition/requisition.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./requisition.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("openlmis-requisition-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("openlmis-requisition");
        }

        // best-effort: 目录创建失败时由打开数据库报错
        std::fs::create_dir_all(&path).ok();
        path = path.join("requisition.db");
    }

    path.to_string_lossy().to_string()
}
