mod api_test;
mod mailing_test;
