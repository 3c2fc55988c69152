pub mod composer;
pub mod dispatch;
pub mod handlers;
pub mod mailer;
pub mod prompts;
