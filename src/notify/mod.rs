pub mod dispatcher;
pub mod gateway;
pub mod schedule;
pub mod scheduler;

pub use dispatcher::NotificationDispatcher;
pub use gateway::BrevoGateway;
pub use schedule::RecurringSchedule;
pub use scheduler::NotificationScheduler;
