//! Response body of the interception service.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, Bytes};
use http_body::{Body as HttpBody, Frame, SizeHint};
use pin_project::pin_project;

/// Body of a response handed back by
/// [`ServiceWorkerService`](crate::ServiceWorkerService).
///
/// Intercepted requests are answered with a fully buffered body, either
/// read from a cache generation or collected from the network. Declined
/// requests stream the wrapped service's body through untouched.
#[pin_project(project = ResponseBodyProj)]
#[derive(Debug)]
pub enum ResponseBody<B> {
    /// Buffered body of an intercepted request.
    ///
    /// The `Option` yields the data once, then `None` on subsequent polls.
    Complete(Option<Bytes>),
    /// Body of the wrapped service, for declined requests.
    Passthrough(#[pin] B),
}

impl<B> ResponseBody<B> {
    /// A buffered body.
    pub fn complete(bytes: Bytes) -> Self {
        if bytes.is_empty() {
            ResponseBody::Complete(None)
        } else {
            ResponseBody::Complete(Some(bytes))
        }
    }
}

impl<B> HttpBody for ResponseBody<B>
where
    B: HttpBody,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.project() {
            ResponseBodyProj::Complete(data) => {
                Poll::Ready(data.take().map(|bytes| Ok(Frame::data(bytes))))
            }
            ResponseBodyProj::Passthrough(body) => match body.poll_frame(cx) {
                Poll::Ready(Some(Ok(frame))) => {
                    let frame = frame.map_data(|mut data| data.copy_to_bytes(data.remaining()));
                    Poll::Ready(Some(Ok(frame)))
                }
                Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => Poll::Ready(None),
                Poll::Pending => Poll::Pending,
            },
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            ResponseBody::Complete(Some(bytes)) => SizeHint::with_exact(bytes.len() as u64),
            ResponseBody::Complete(None) => SizeHint::with_exact(0),
            ResponseBody::Passthrough(body) => body.size_hint(),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            ResponseBody::Complete(data) => data.is_none(),
            ResponseBody::Passthrough(body) => body.is_end_stream(),
        }
    }
}
