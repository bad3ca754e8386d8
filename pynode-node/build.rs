fn main() {
    // Node resolves napi_* symbols from the host process at load time
    napi_build::setup();
}
