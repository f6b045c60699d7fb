//! Environment overrides of the node configuration.

use gitview_node::config::NodeConfig;
use std::io::Write;

#[test]
fn test_environment_overrides_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(b"web:\n  site_name: from-file\n  log_page_size: 20\n")
        .unwrap();

    std::env::set_var("GITVIEW__WEB__SITE_NAME", "from-env");
    std::env::set_var("GITVIEW__SERVER__BIND_ADDR", "0.0.0.0:9090");
    let config = NodeConfig::load(Some(file.path())).unwrap();
    std::env::remove_var("GITVIEW__WEB__SITE_NAME");
    std::env::remove_var("GITVIEW__SERVER__BIND_ADDR");

    assert_eq!(config.web.site_name, "from-env");
    assert_eq!(config.web.log_page_size, 20);
    assert_eq!(config.server.bind_addr.port(), 9090);
}
