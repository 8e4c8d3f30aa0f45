use std::process::Command;

#[test]
fn sim_binary_smoke() {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--bin", "sim", "--", "7", "3"])
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("failed to run sim binary");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("non utf8 output");
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).expect("invalid json");
    assert_eq!(v["games"], 3);
    let wins = v["player1"]["wins"].as_u64().unwrap() + v["player2"]["wins"].as_u64().unwrap();
    assert_eq!(wins, 3);
    assert!(v["average_rounds"].as_f64().unwrap() > 0.0);
}
