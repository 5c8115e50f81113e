use mongodb::Database;
use groupframe_config::Settings;
use groupframe_services::{
    AmbassadorService, AuthService, DashboardService, OrderService, OtpService, RenderService,
    TaskService,
    dao::{
        ambassador::AmbassadorDao, order::OrderDao, reward::RewardDao, user::UserDao,
        waitlist::WaitlistDao,
    },
    sms::provider_from_settings,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub waitlist: Arc<WaitlistDao>,
    pub ambassadors: Arc<AmbassadorDao>,
    pub orders: Arc<OrderDao>,
    pub rewards: Arc<RewardDao>,
    pub tasks: Arc<TaskService>,
    pub ambassador_service: Arc<AmbassadorService>,
    pub order_service: Arc<OrderService>,
    pub otp: Arc<OtpService>,
    pub render: Arc<RenderService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let users = Arc::new(UserDao::new(&db));
        let waitlist = Arc::new(WaitlistDao::new(&db));
        let ambassadors = Arc::new(AmbassadorDao::new(&db));
        let orders = Arc::new(OrderDao::new(&db));
        let rewards = Arc::new(RewardDao::new(&db));
        let tasks = Arc::new(TaskService::new(&db));

        let ambassador_service = Arc::new(AmbassadorService::new(
            Arc::clone(&waitlist),
            Arc::clone(&ambassadors),
        ));
        let order_service = Arc::new(OrderService::new(
            Arc::clone(&orders),
            Arc::clone(&ambassadors),
            Arc::clone(&rewards),
            settings.pricing.clone(),
            settings.referral.clone(),
        ));
        let otp = Arc::new(OtpService::new(
            &db,
            provider_from_settings(&settings.sms),
            settings.sms.clone(),
        ));
        let render = Arc::new(RenderService::new(
            Arc::clone(&orders),
            Arc::clone(&tasks),
            settings.render.clone(),
        ));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&orders),
            Arc::clone(&waitlist),
            Arc::clone(&ambassadors),
            Arc::clone(&rewards),
        ));

        Self {
            db,
            settings,
            auth,
            users,
            waitlist,
            ambassadors,
            orders,
            rewards,
            tasks,
            ambassador_service,
            order_service,
            otp,
            render,
            dashboard,
        }
    }
}
