mod fetch_json;
mod request;
