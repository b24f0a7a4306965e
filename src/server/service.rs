use may_minihttp::{HttpService, Request, Response};
use std::io;
use tracing::warn;

use super::request::parse_request;
use super::response::write_response;
use crate::context;
use crate::engine::App;

impl HttpService for App {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let request = match parse_request(req) {
            Ok(request) => request,
            Err(err) if err.kind() == io::ErrorKind::InvalidInput => {
                warn!(error = %err, "Rejecting unparseable request");
                let mut bad = context::Response::default();
                bad.set_header("Content-Type", "text/plain");
                bad.write_header(400);
                bad.write(b"400 BAD REQUEST\n");
                write_response(res, bad);
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        write_response(res, self.dispatch(request));
        Ok(())
    }
}
