mod newsletter_notifier;
mod subscriber_service;

pub use newsletter_notifier::NewsletterNotifier;
pub use subscriber_service::SubscriberService;
